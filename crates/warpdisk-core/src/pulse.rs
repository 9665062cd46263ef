// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Pulse Assembler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Phase-resolved light curves over one spin of the central source.
//!
//! Each of `n_rotations` spin angles gets its own beam field and heating
//! map (computed in parallel, shared by all views). Each viewing azimuth
//! gets one visibility mask, reused for every spin angle.

use std::f64::consts::PI;

use ndarray::Array1;
use rayon::prelude::*;
use warpdisk_types::config::{SimulationConfig, SpectralMode};
use warpdisk_types::error::{DiskError, DiskResult};
use warpdisk_types::state::{IlluminationMap, PulseProfile, SphereGrid, Spectrum, VisibilityMask};

use crate::band_table::BandTableCache;
use crate::beam::{Beam, BeamField};
use crate::disk::DiskSurface;
use crate::illumination::{solve_illumination, HeatingParams};
use crate::spectrum::SpectralSynthesizer;
use crate::visibility::{compute_visibility, ObserverView};

/// Beam field and disk heating at one spin angle.
#[derive(Debug, Clone)]
pub struct RotationFrame {
    pub index: usize,
    /// Spin phase in cycles, `index / n_rotations`.
    pub rotation_phase: f64,
    pub field: BeamField,
    pub illumination: IlluminationMap,
}

impl RotationFrame {
    /// Reprocessed luminosity of the whole disk (1e38 erg/s).
    pub fn emitted(&self) -> f64 {
        self.illumination.emitted_luminosity()
    }
}

/// Light curves seen from one viewing azimuth.
#[derive(Debug, Clone)]
pub struct ViewResult {
    pub view: ObserverView,
    pub mask: VisibilityMask,
    pub profile: PulseProfile,
    /// Disk spectrum per spin angle, exact mode only.
    pub spectra: Option<Vec<Spectrum>>,
}

#[derive(Debug, Clone)]
pub struct PulseRun {
    pub frames: Vec<RotationFrame>,
    pub views: Vec<ViewResult>,
}

impl PulseRun {
    /// Extremes of the lit-element temperature over every frame.
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.frames
            .iter()
            .filter_map(|f| f.illumination.temperature_range())
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }

    /// Emitted luminosity per spin angle.
    pub fn emitted(&self) -> Array1<f64> {
        self.frames.iter().map(RotationFrame::emitted).collect()
    }
}

pub struct PulseAssembler {
    surface: DiskSurface,
    grid: SphereGrid,
    beams: Vec<Beam>,
    floor: f64,
    heating: HeatingParams,
    elevation: f64,
    view_phases: Vec<f64>,
    n_rotations: usize,
    synthesizer: SpectralSynthesizer,
}

impl PulseAssembler {
    pub fn from_config(cfg: &SimulationConfig) -> DiskResult<Self> {
        let cache = BandTableCache::from_config(&cfg.spectral);
        PulseAssembler::with_cache(cfg, &cache)
    }

    /// Like [`PulseAssembler::from_config`] but draws band tables from a
    /// caller-owned cache, so several runs share them.
    pub fn with_cache(cfg: &SimulationConfig, cache: &BandTableCache) -> DiskResult<Self> {
        cfg.validate()?;
        let surface = DiskSurface::from_config(&cfg.disk)?;
        let grid = SphereGrid::new(cfg.source.n_theta, cfg.source.n_phi)?;
        let beams = cfg
            .beams
            .iter()
            .map(Beam::from_config)
            .collect::<DiskResult<Vec<_>>>()?;
        let synthesizer = SpectralSynthesizer::from_config(&cfg.spectral, cache)?;

        Ok(PulseAssembler {
            surface,
            grid,
            beams,
            floor: cfg.source.floor,
            heating: HeatingParams::from_config(&cfg.source),
            elevation: cfg.observer.elevation_deg.to_radians(),
            view_phases: cfg.view_phases(),
            n_rotations: cfg.n_rotations,
            synthesizer,
        })
    }

    pub fn surface(&self) -> &DiskSurface {
        &self.surface
    }

    pub fn n_rotations(&self) -> usize {
        self.n_rotations
    }

    /// Configured viewing directions, in sweep order.
    pub fn views(&self) -> Vec<ObserverView> {
        self.view_phases
            .iter()
            .map(|&p| ObserverView::new(self.elevation, p))
            .collect()
    }

    /// Spin angle of frame `index`, in radians.
    pub fn rotation_angle(&self, index: usize) -> f64 {
        2.0 * PI * index as f64 / self.n_rotations as f64
    }

    pub fn frame(&self, index: usize) -> DiskResult<RotationFrame> {
        let angle = self.rotation_angle(index);
        let beams: Vec<Beam> = self.beams.iter().map(|b| b.at_rotation(angle)).collect();
        let field = BeamField::compute(&self.grid, &beams, self.floor)?;
        let illumination = solve_illumination(&self.surface, &field, self.heating)?;
        log::debug!(
            "frame {index}/{}: emitted {:.4e}",
            self.n_rotations,
            illumination.emitted_luminosity()
        );
        Ok(RotationFrame {
            index,
            rotation_phase: index as f64 / self.n_rotations as f64,
            field,
            illumination,
        })
    }

    /// Every spin angle, in parallel.
    pub fn frames(&self) -> DiskResult<Vec<RotationFrame>> {
        (0..self.n_rotations)
            .into_par_iter()
            .map(|k| self.frame(k))
            .collect()
    }

    /// Direct beam flux toward the observer, 4π·L·ℓ(view direction).
    pub fn hard_flux(&self, frame: &RotationFrame, view: &ObserverView) -> DiskResult<f64> {
        let density = frame
            .field
            .sample(view.elevation, 2.0 * PI * view.azimuth_phase)?;
        Ok(4.0 * PI * self.heating.luminosity_38 * density)
    }

    /// Light curves for one view over precomputed frames.
    pub fn view(&self, frames: &[RotationFrame], view: ObserverView) -> DiskResult<ViewResult> {
        if frames.is_empty() {
            return Err(DiskError::ConfigError("no rotation frames to assemble".to_string()));
        }
        let mask = compute_visibility(&self.surface, &view);
        let n = frames.len();
        let mut hard = Vec::with_capacity(n);
        let mut soft = Vec::with_capacity(n);
        let mut bolometric = Vec::with_capacity(n);
        let mut spectra = Vec::new();

        for frame in frames {
            hard.push(self.hard_flux(frame, &view)?);
            let emission = self.synthesizer.synthesize(&frame.illumination, &mask)?;
            soft.push(emission.band_flux);
            bolometric.push(emission.bolometric);
            spectra.extend(emission.spectrum);
        }
        log::debug!(
            "view at azimuth {:.4}: {} visible elements, mean soft {:.4e}",
            view.azimuth_phase,
            mask.n_visible(),
            soft.iter().sum::<f64>() / n as f64
        );

        let spectra = match self.synthesizer.mode() {
            SpectralMode::Exact => Some(spectra),
            SpectralMode::Fast => None,
        };
        Ok(ViewResult {
            view,
            mask,
            profile: PulseProfile::new(hard, soft, bolometric)?,
            spectra,
        })
    }

    pub fn run(&self) -> DiskResult<PulseRun> {
        let frames = self.frames()?;
        let views = self
            .views()
            .into_par_iter()
            .map(|v| self.view(&frames, v))
            .collect::<DiskResult<Vec<_>>>()?;
        let run = PulseRun { frames, views };
        match run.temperature_range() {
            Some((lo, hi)) => log::info!(
                "pulse run: {} frames, {} views, T in [{lo:.3e}, {hi:.3e}] K",
                run.frames.len(),
                run.views.len()
            ),
            None => log::warn!("pulse run: no disk element was illuminated"),
        }
        Ok(run)
    }
}
