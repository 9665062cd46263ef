// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::f64::consts::PI;

use ndarray::{Array1, Array2};

use crate::error::{DiskError, DiskResult};

/// Temperature stored for elements that are not illuminated.
pub const NO_TEMPERATURE: f64 = 0.0;

/// Latitude/longitude sampling of the source sphere.
///
/// `theta` holds latitude cell centres, half a step in from each pole, so
/// no row sits on a pole and every row carries solid angle. `phi` covers
/// [0, 2π) without the wrap duplicate.
#[derive(Debug, Clone)]
pub struct SphereGrid {
    pub n_theta: usize,
    pub n_phi: usize,
    pub theta: Array1<f64>,       // latitude [n_theta]
    pub phi: Array1<f64>,         // longitude [n_phi]
    pub dtheta: f64,
    pub dphi: f64,
    pub solid_angle: Array1<f64>, // per-row cell solid angle [n_theta]
}

impl SphereGrid {
    pub fn new(n_theta: usize, n_phi: usize) -> DiskResult<Self> {
        if n_theta < 2 || n_phi < 2 {
            return Err(DiskError::ConfigError(format!(
                "sphere grid must be at least 2x2, got {n_theta}x{n_phi}"
            )));
        }
        let dtheta = PI / n_theta as f64;
        let theta = Array1::from_shape_fn(n_theta, |k| -PI / 2.0 + (k as f64 + 0.5) * dtheta);
        let dphi = 2.0 * PI / n_phi as f64;
        let phi = Array1::from_shape_fn(n_phi, |k| k as f64 * dphi);
        let solid_angle = theta.mapv(|th: f64| dtheta * dphi * th.cos());

        Ok(SphereGrid {
            n_theta,
            n_phi,
            theta,
            phi,
            dtheta,
            dphi,
            solid_angle,
        })
    }

    /// Sum of all cell solid angles (≈ 4π).
    pub fn total_solid_angle(&self) -> f64 {
        self.solid_angle.sum() * self.n_phi as f64
    }
}

/// Which face of a disk element the central source reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Bottom,
    #[default]
    Dark,
    Top,
}

impl Side {
    pub fn sign(self) -> i8 {
        match self {
            Side::Bottom => -1,
            Side::Dark => 0,
            Side::Top => 1,
        }
    }

    pub fn is_lit(self) -> bool {
        self != Side::Dark
    }
}

/// Per-element heating of the disk for one beam orientation. Arrays are
/// `[n_points, n_profiles]`. Absorbed flux is in 1e38 erg/s, temperature in K.
#[derive(Debug, Clone)]
pub struct IlluminationMap {
    pub side: Array2<Side>,
    pub solid_angle: Array2<f64>,
    pub absorbed: Array2<f64>,
    pub temperature: Array2<f64>,
}

impl IlluminationMap {
    pub fn new(n_points: usize, n_profiles: usize) -> Self {
        IlluminationMap {
            side: Array2::from_elem((n_points, n_profiles), Side::Dark),
            solid_angle: Array2::zeros((n_points, n_profiles)),
            absorbed: Array2::zeros((n_points, n_profiles)),
            temperature: Array2::from_elem((n_points, n_profiles), NO_TEMPERATURE),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.side.dim()
    }

    /// Total reprocessed luminosity: absorbed flux summed over lit elements.
    pub fn emitted_luminosity(&self) -> f64 {
        self.side
            .iter()
            .zip(self.absorbed.iter())
            .filter(|(s, _)| s.is_lit())
            .map(|(_, &l)| l)
            .sum()
    }

    pub fn n_lit(&self) -> usize {
        self.side.iter().filter(|s| s.is_lit()).count()
    }

    /// (min, max) temperature over lit elements, `None` if nothing is lit.
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.side
            .iter()
            .zip(self.temperature.iter())
            .filter(|(s, t)| s.is_lit() && t.is_finite() && **t > 0.0)
            .map(|(_, &t)| t)
            .fold(None, |acc, t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
    }
}

/// What an observer at a fixed elevation and azimuth can see of the disk.
#[derive(Debug, Clone)]
pub struct VisibilityMask {
    pub elevation: f64,
    pub azimuth_phase: f64,
    /// Not hidden behind nearer parts of the disk.
    pub visible: Array2<bool>,
    /// Sign of the face turned to the observer: +1 top, -1 bottom, 0 edge-on.
    pub facing: Array2<i8>,
    /// Projected fraction of the element area toward the observer.
    pub facing_fraction: Array2<f64>,
}

impl VisibilityMask {
    pub fn dim(&self) -> (usize, usize) {
        self.visible.dim()
    }

    /// True when the element is unoccluded and its lit face points at us.
    pub fn sees(&self, i: usize, j: usize, side: Side) -> bool {
        self.visible[[i, j]] && self.facing[[i, j]] * side.sign() == 1
    }

    pub fn n_visible(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }
}

/// Aggregate disk spectrum: flux density per keV on a log energy grid.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub energy_kev: Array1<f64>,
    pub flux: Array1<f64>,
}

/// Hard (direct beam) and soft (reprocessed) light curves over one spin.
#[derive(Debug, Clone)]
pub struct PulseProfile {
    pub phase: Array1<f64>,
    pub hard: Array1<f64>,
    pub soft: Array1<f64>,
    /// Reprocessed flux before band selection.
    pub soft_bolometric: Array1<f64>,
}

fn roll(values: &Array1<f64>, steps: usize) -> Array1<f64> {
    let n = values.len();
    Array1::from_shape_fn(n, |k| values[(k + steps) % n])
}

fn mean_normalized(values: &Array1<f64>) -> Array1<f64> {
    match values.mean() {
        Some(m) if m > 0.0 && m.is_finite() => values / m,
        _ => values.clone(),
    }
}

impl PulseProfile {
    pub fn new(hard: Vec<f64>, soft: Vec<f64>, soft_bolometric: Vec<f64>) -> DiskResult<Self> {
        let n = hard.len();
        if soft.len() != n || soft_bolometric.len() != n {
            return Err(DiskError::ConfigError(format!(
                "pulse channels differ in length: hard={n}, soft={}, bolometric={}",
                soft.len(),
                soft_bolometric.len()
            )));
        }
        Ok(PulseProfile {
            phase: Array1::from_shape_fn(n, |k| k as f64 / n as f64),
            hard: Array1::from_vec(hard),
            soft: Array1::from_vec(soft),
            soft_bolometric: Array1::from_vec(soft_bolometric),
        })
    }

    pub fn len(&self) -> usize {
        self.phase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phase.is_empty()
    }

    /// Cyclic roll: sample `k` of the result is sample `k + steps` of `self`.
    /// The phase axis is left unchanged.
    pub fn rolled(&self, steps: usize) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        let steps = steps % self.len();
        PulseProfile {
            phase: self.phase.clone(),
            hard: roll(&self.hard, steps),
            soft: roll(&self.soft, steps),
            soft_bolometric: roll(&self.soft_bolometric, steps),
        }
    }

    /// Roll by a phase offset, rounded to the nearest whole step.
    pub fn shifted(&self, phase_offset: f64) -> Self {
        if self.is_empty() || !phase_offset.is_finite() {
            return self.clone();
        }
        let n = self.len();
        let steps = (phase_offset.rem_euclid(1.0) * n as f64).round() as usize % n;
        self.rolled(steps)
    }

    /// Each channel divided by its mean.
    pub fn normalized(&self) -> Self {
        PulseProfile {
            phase: self.phase.clone(),
            hard: mean_normalized(&self.hard),
            soft: mean_normalized(&self.soft),
            soft_bolometric: mean_normalized(&self.soft_bolometric),
        }
    }

    pub fn hard_peak_index(&self) -> Option<usize> {
        peak_index(&self.hard)
    }

    pub fn soft_peak_index(&self) -> Option<usize> {
        peak_index(&self.soft)
    }

    /// Roll so the hard peak lands on `target`.
    pub fn aligned_to_hard_peak(&self, target: usize) -> Self {
        match self.hard_peak_index() {
            Some(peak) => {
                let n = self.len();
                self.rolled((peak + n - target % n) % n)
            }
            None => self.clone(),
        }
    }
}

fn peak_index(values: &Array1<f64>) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
