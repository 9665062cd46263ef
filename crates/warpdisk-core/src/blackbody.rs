// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Blackbody Spectra
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Planck spectra on a logarithmic energy grid.
//!
//! Spectral shape E³ / (exp(E/kT) − 1), normalised so the left-Riemann
//! integral over the reference grid is 1.

use ndarray::Array1;
use warpdisk_math::quadrature::{bin_widths, riemann_band};
use warpdisk_types::constants::{
    KEV_TO_ERG, K_BOLTZMANN_CGS, SPECTRUM_BINS, SPECTRUM_E_MAX_KEV, SPECTRUM_E_MIN_KEV,
};
use warpdisk_types::error::{DiskError, DiskResult};

/// Closed energy band in keV, `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low_kev: f64,
    pub high_kev: f64,
}

impl Band {
    pub fn new(low_kev: f64, high_kev: f64) -> DiskResult<Self> {
        if !low_kev.is_finite() || !high_kev.is_finite() || low_kev < 0.0 || low_kev >= high_kev {
            return Err(DiskError::ConfigError(format!(
                "energy band must satisfy 0 <= low < high, got [{low_kev}, {high_kev}]"
            )));
        }
        Ok(Band { low_kev, high_kev })
    }

    /// Exact bit pattern of both edges.
    pub fn key(&self) -> (u64, u64) {
        (self.low_kev.to_bits(), self.high_kev.to_bits())
    }

    /// Persisted table name, e.g. `bbf00.60_10.00.npz` for 0.6–10 keV.
    pub fn table_file_name(&self) -> String {
        format!("bbf{:05.2}_{:05.2}.npz", self.low_kev, self.high_kev)
    }
}

/// Photon energies (keV) with precomputed bin widths.
#[derive(Debug, Clone)]
pub struct EnergyGrid {
    pub energy_kev: Array1<f64>,
    widths: Vec<f64>,
}

impl Default for EnergyGrid {
    fn default() -> Self {
        EnergyGrid::logspace(SPECTRUM_E_MIN_KEV, SPECTRUM_E_MAX_KEV, SPECTRUM_BINS)
    }
}

impl EnergyGrid {
    /// `n` log-spaced energies from `e_min` to `e_max` inclusive.
    pub fn logspace(e_min: f64, e_max: f64, n: usize) -> Self {
        let energy_kev = Array1::logspace(10.0, e_min.log10(), e_max.log10(), n);
        let widths = energy_kev
            .as_slice()
            .map(bin_widths)
            .unwrap_or_default();
        EnergyGrid { energy_kev, widths }
    }

    pub fn len(&self) -> usize {
        self.energy_kev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_kev.is_empty()
    }

    /// Left-Riemann integral of `density` over the grid.
    pub fn integrate(&self, density: &Array1<f64>) -> f64 {
        self.widths.iter().zip(density.iter()).map(|(w, d)| w * d).sum()
    }

    /// Left-Riemann integral restricted to bins starting inside the band.
    pub fn integrate_band(&self, density: &Array1<f64>, band: Band) -> f64 {
        match (self.energy_kev.as_slice(), density.as_slice()) {
            (Some(e), Some(d)) => riemann_band(e, d, band.low_kev, band.high_kev),
            _ => self
                .energy_kev
                .iter()
                .zip(self.widths.iter())
                .zip(density.iter())
                .filter(|((&e, _), _)| e >= band.low_kev && e < band.high_kev)
                .map(|((_, w), d)| w * d)
                .sum(),
        }
    }
}

/// kT in keV.
pub fn thermal_energy_kev(temperature: f64) -> f64 {
    K_BOLTZMANN_CGS * temperature / KEV_TO_ERG
}

/// Unnormalised Planck shape; `None` for a non-positive or non-finite
/// temperature.
pub fn planck_shape(temperature: f64, grid: &EnergyGrid) -> Option<Array1<f64>> {
    if !(temperature > 0.0) || !temperature.is_finite() {
        return None;
    }
    let kt = thermal_energy_kev(temperature);
    Some(grid.energy_kev.mapv(|e| {
        let occupancy = (e / kt).exp_m1();
        if occupancy.is_finite() && occupancy > 0.0 {
            e * e * e / occupancy
        } else {
            0.0
        }
    }))
}

/// Planck spectrum with unit integral over the grid.
pub fn planck_normalized(temperature: f64, grid: &EnergyGrid) -> Option<Array1<f64>> {
    let shape = planck_shape(temperature, grid)?;
    let total = grid.integrate(&shape);
    (total > 0.0 && total.is_finite()).then(|| shape / total)
}

/// Fraction of a blackbody's power inside `band`, by direct integration.
pub fn band_fraction_exact(temperature: f64, grid: &EnergyGrid, band: Band) -> Option<f64> {
    let spectrum = planck_normalized(temperature, grid)?;
    Some(grid.integrate_band(&spectrum, band))
}
