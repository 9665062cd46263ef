// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Spectral Synthesizer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Observed disk emission: each element the observer sees contributes its
//! absorbed flux, scaled by the projected area fraction, as a blackbody at
//! its local temperature.

use std::sync::Arc;

use ndarray::Array1;
use warpdisk_types::config::{SpectralConfig, SpectralMode};
use warpdisk_types::error::{DiskError, DiskResult};
use warpdisk_types::state::{IlluminationMap, Spectrum, VisibilityMask};

use crate::band_table::{BandFractionTable, BandTableCache};
use crate::blackbody::{planck_normalized, Band, EnergyGrid};

/// Flux reaching the observer from one illumination state.
#[derive(Debug, Clone)]
pub struct DiskEmission {
    /// Sum of intensities over contributing elements (1e38 erg/s units).
    pub bolometric: f64,
    /// Portion of `bolometric` inside the band.
    pub band_flux: f64,
    /// Aggregate spectrum, exact mode only.
    pub spectrum: Option<Spectrum>,
    pub n_contributing: usize,
}

#[derive(Debug, Clone)]
pub struct SpectralSynthesizer {
    mode: SpectralMode,
    band: Band,
    energy: EnergyGrid,
    table: Option<Arc<BandFractionTable>>,
}

impl SpectralSynthesizer {
    /// Fast mode fetches its table up front, so later calls never touch the
    /// cache.
    pub fn new(mode: SpectralMode, band: Band, cache: &BandTableCache) -> DiskResult<Self> {
        let table = match mode {
            SpectralMode::Fast => Some(cache.get(band)?),
            SpectralMode::Exact => None,
        };
        Ok(SpectralSynthesizer {
            mode,
            band,
            energy: EnergyGrid::default(),
            table,
        })
    }

    pub fn from_config(cfg: &SpectralConfig, cache: &BandTableCache) -> DiskResult<Self> {
        let band = Band::new(cfg.band_low_kev, cfg.band_high_kev)?;
        SpectralSynthesizer::new(cfg.mode, band, cache)
    }

    pub fn mode(&self) -> SpectralMode {
        self.mode
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn energy(&self) -> &EnergyGrid {
        &self.energy
    }

    pub fn synthesize(
        &self,
        map: &IlluminationMap,
        mask: &VisibilityMask,
    ) -> DiskResult<DiskEmission> {
        if map.dim() != mask.dim() {
            return Err(DiskError::ConfigError(format!(
                "illumination map {:?} and visibility mask {:?} differ in shape",
                map.dim(),
                mask.dim()
            )));
        }

        let mut bolometric = 0.0;
        let mut band_flux = 0.0;
        let mut n_contributing = 0usize;
        let mut skipped = 0usize;
        let mut spectrum = match self.mode {
            SpectralMode::Exact => Some(Array1::<f64>::zeros(self.energy.len())),
            SpectralMode::Fast => None,
        };

        for ((i, j), &side) in map.side.indexed_iter() {
            if !mask.sees(i, j, side) {
                continue;
            }
            let t = map.temperature[[i, j]];
            if !(t > 0.0) || !t.is_finite() {
                skipped += 1;
                continue;
            }
            let intensity = mask.facing_fraction[[i, j]] * map.absorbed[[i, j]];

            match (&self.table, spectrum.as_mut()) {
                (Some(table), _) => match table.fraction(t) {
                    Some(f) => band_flux += intensity * f,
                    None => {
                        skipped += 1;
                        continue;
                    }
                },
                (None, Some(acc)) => match planck_normalized(t, &self.energy) {
                    Some(shape) => acc.scaled_add(intensity, &shape),
                    None => {
                        skipped += 1;
                        continue;
                    }
                },
                (None, None) => {}
            }
            bolometric += intensity;
            n_contributing += 1;
        }

        if skipped > 0 {
            log::warn!("{skipped} visible elements skipped for lack of a usable temperature");
        }

        let spectrum = spectrum.map(|flux| {
            let total = self.energy.integrate(&flux);
            if total > 0.0 {
                band_flux = bolometric * self.energy.integrate_band(&flux, self.band) / total;
            }
            Spectrum {
                energy_kev: self.energy.energy_kev.clone(),
                flux,
            }
        });

        Ok(DiskEmission {
            bolometric,
            band_flux,
            spectrum,
            n_contributing,
        })
    }
}
