// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Disk Surface
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Twisted, tilted annulus sampled on a `[n_points, n_profiles]` grid.
//!
//! Profile `j` is a ring of radius `r_j` whose tilt amplitude and phase
//! offset grow linearly from the inner to the outer edge. The warp angle of
//! element `(i, j)` is
//!
//!   β(i, j) = −A_j · sin(2π·φ_i + δ_j)
//!
//! and its Cartesian position is `r_j·(cos 2πφ_i cos β, sin 2πφ_i cos β, sin β)`.

use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use warpdisk_types::config::DiskConfig;
use warpdisk_types::constants::DISK_PHASE_EPSILON;
use warpdisk_types::error::{DiskError, DiskResult};

/// Vertices in [`DiskSurface::cell_outline`].
pub const CELL_OUTLINE_VERTICES: usize = 8;

/// Disk shape in radians and radius units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskParams {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub inner_tilt: f64,
    pub outer_tilt: f64,
    pub phase_offset: f64,
}

impl DiskParams {
    pub fn from_config(cfg: &DiskConfig) -> Self {
        DiskParams {
            inner_radius: cfg.inner_radius,
            outer_radius: cfg.outer_radius,
            inner_tilt: cfg.inner_tilt_deg.to_radians(),
            outer_tilt: cfg.outer_tilt_deg.to_radians(),
            phase_offset: cfg.phase_offset_deg.to_radians(),
        }
    }

    fn validate(&self) -> DiskResult<()> {
        let all = [
            self.inner_radius,
            self.outer_radius,
            self.inner_tilt,
            self.outer_tilt,
            self.phase_offset,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(DiskError::ConfigError(
                "disk parameters must be finite".to_string(),
            ));
        }
        if self.inner_radius <= 0.0 || self.outer_radius <= self.inner_radius {
            return Err(DiskError::ConfigError(format!(
                "disk radii must satisfy 0 < inner < outer, got {} and {}",
                self.inner_radius, self.outer_radius
            )));
        }
        Ok(())
    }
}

/// Sampled disk geometry. Immutable once built.
#[derive(Debug, Clone)]
pub struct DiskSurface {
    pub params: DiskParams,
    /// Azimuthal phase of each point in cycles, `k/n_points + ε`.
    pub phase: Array1<f64>,
    /// Radius of each profile.
    pub radius: Array1<f64>,
    /// Warp (elevation) angle β [n_points, n_profiles].
    pub warp: Array2<f64>,
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub z: Array2<f64>,
}

impl DiskSurface {
    pub fn new(params: DiskParams, n_points: usize, n_profiles: usize) -> DiskResult<Self> {
        params.validate()?;
        if n_points < 3 || n_profiles < 3 {
            return Err(DiskError::ConfigError(format!(
                "disk grid must be at least 3x3, got {n_points}x{n_profiles}"
            )));
        }

        let phase = Array1::from_shape_fn(n_points, |k| {
            k as f64 / n_points as f64 + DISK_PHASE_EPSILON
        });
        let radius = Array1::linspace(params.inner_radius, params.outer_radius, n_profiles);
        let amplitude = Array1::linspace(params.inner_tilt, params.outer_tilt, n_profiles);
        let offset = Array1::linspace(0.0, params.phase_offset, n_profiles);

        let warp = Array2::from_shape_fn((n_points, n_profiles), |(i, j)| {
            -amplitude[j] * (2.0 * PI * phase[i] + offset[j]).sin()
        });

        let mut x = Array2::zeros((n_points, n_profiles));
        let mut y = Array2::zeros((n_points, n_profiles));
        let mut z = Array2::zeros((n_points, n_profiles));
        for i in 0..n_points {
            let (s, c) = (2.0 * PI * phase[i]).sin_cos();
            for j in 0..n_profiles {
                let (sb, cb) = warp[[i, j]].sin_cos();
                let r = radius[j];
                x[[i, j]] = r * c * cb;
                y[[i, j]] = r * s * cb;
                z[[i, j]] = r * sb;
            }
        }

        Ok(DiskSurface {
            params,
            phase,
            radius,
            warp,
            x,
            y,
            z,
        })
    }

    pub fn from_config(cfg: &DiskConfig) -> DiskResult<Self> {
        DiskSurface::new(DiskParams::from_config(cfg), cfg.n_points, cfg.n_profiles)
    }

    /// `(n_points, n_profiles)`
    pub fn dim(&self) -> (usize, usize) {
        self.warp.dim()
    }

    /// Phase step between neighbouring points, in cycles.
    pub fn phase_step(&self) -> f64 {
        1.0 / self.phase.len() as f64
    }

    /// Position at fractional phase `phase` (cycles) and fractional profile
    /// coordinate `u` in `[0, n_profiles - 1]`.
    pub fn position_at(&self, phase: f64, u: f64) -> [f64; 3] {
        let last = (self.radius.len() - 1) as f64;
        let t = (u / last).clamp(0.0, 1.0);
        let p = &self.params;
        let r = p.inner_radius + t * (p.outer_radius - p.inner_radius);
        let amplitude = p.inner_tilt + t * (p.outer_tilt - p.inner_tilt);
        let offset = t * p.phase_offset;
        let az = 2.0 * PI * phase;
        let beta = -amplitude * (az + offset).sin();
        [r * az.cos() * beta.cos(), r * az.sin() * beta.cos(), r * beta.sin()]
    }

    /// Outline of element `(i, j)`: the surface points half a step away in
    /// phase and half a profile away in radius, walked around the element.
    ///
    /// Each side passes through the midpoint of the matching edge, so the
    /// outline meets the surface on the element's own meridian and ring.
    /// Neighbouring outlines share their common side. Rim sides
    /// clamp to the inner and outer edge.
    pub fn cell_outline(&self, i: usize, j: usize) -> [[f64; 3]; CELL_OUTLINE_VERTICES] {
        let phase = self.phase[i];
        let half = 0.5 * self.phase_step();
        let u = j as f64;
        [
            self.position_at(phase - half, u - 0.5),
            self.position_at(phase, u - 0.5),
            self.position_at(phase + half, u - 0.5),
            self.position_at(phase + half, u),
            self.position_at(phase + half, u + 0.5),
            self.position_at(phase, u + 0.5),
            self.position_at(phase - half, u + 0.5),
            self.position_at(phase - half, u),
        ]
    }
}
