// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Beam Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Anisotropic luminosity pattern of the central source.
//!
//! Each beam is a Gaussian ridge in great-circle distance from its centre:
//!
//!   L(d) = norm · exp(-(d - offset)² / (2 σ²))
//!
//! Beams add, a uniform floor is added, and the result is divided by its
//! solid-angle integral so the pattern integrates to 1 over the sphere.

use warpdisk_math::interp::nearest_cell;
use warpdisk_math::sphere::{angle_diff, sph_dist, wrap_angle};
use warpdisk_types::config::BeamConfig;
use warpdisk_types::constants::BEAM_NODE_EPSILON;
use warpdisk_types::error::{DiskError, DiskResult};
use warpdisk_types::state::SphereGrid;
use ndarray::Array2;

/// Separation below which a beam centre counts as sitting on a grid node.
const NODE_COINCIDENCE: f64 = 1e-12;

/// One beam lobe. Only the rotation changes after construction; the
/// longitude is always recomputed from the base longitude, so repeated
/// rotations never accumulate drift.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    base_longitude: f64,
    rotation: f64,
    latitude: f64,
    width: f64,
    offset: f64,
    norm: f64,
}

impl Beam {
    /// Angles in radians.
    pub fn new(
        longitude: f64,
        latitude: f64,
        width: f64,
        offset: f64,
        norm: f64,
    ) -> DiskResult<Self> {
        let inputs = [longitude, latitude, offset, norm];
        if inputs.iter().any(|v| !v.is_finite()) {
            return Err(DiskError::ConfigError(
                "beam longitude/latitude/offset/norm must be finite".to_string(),
            ));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(DiskError::ConfigError(format!(
                "beam width must be finite and > 0, got {width}"
            )));
        }
        Ok(Beam {
            base_longitude: longitude,
            rotation: 0.0,
            latitude,
            width,
            offset,
            norm,
        })
    }

    pub fn from_config(cfg: &BeamConfig) -> DiskResult<Self> {
        Beam::new(
            cfg.longitude_deg.to_radians(),
            cfg.latitude_deg.to_radians(),
            cfg.width_deg.to_radians(),
            cfg.offset_deg.to_radians(),
            cfg.norm,
        )
    }

    /// Current longitude in [0, 2π).
    pub fn longitude(&self) -> f64 {
        wrap_angle(self.base_longitude + self.rotation)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Total rotation applied relative to the unrotated beam.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The same beam turned by a further `angle` about the spin axis.
    pub fn rotated(&self, angle: f64) -> Beam {
        Beam {
            rotation: self.rotation + angle,
            ..self.clone()
        }
    }

    /// The unrotated beam turned by exactly `angle`.
    pub fn at_rotation(&self, angle: f64) -> Beam {
        Beam {
            rotation: angle,
            ..self.clone()
        }
    }

    /// Unnormalised lobe strength at great-circle distance `dist`.
    pub fn profile(&self, dist: f64) -> f64 {
        let u = dist - self.offset;
        self.norm * (-(u * u) / (2.0 * self.width * self.width)).exp()
    }

    /// Beam centre moved off any coinciding grid node by a small fraction
    /// of the grid step.
    fn centre_on(&self, grid: &SphereGrid) -> (f64, f64) {
        let mut lon = self.longitude();
        let mut lat = self.latitude;
        if grid.phi.iter().any(|&p| angle_diff(p, lon) < NODE_COINCIDENCE) {
            lon += BEAM_NODE_EPSILON * grid.dphi;
        }
        if grid.theta.iter().any(|&t| (t - lat).abs() < NODE_COINCIDENCE) {
            let nudge = BEAM_NODE_EPSILON * grid.dtheta;
            lat = if lat > 0.0 { lat - nudge } else { lat + nudge };
        }
        (lon, lat)
    }
}

/// Normalised luminosity density `[n_theta, n_phi]` on a sphere grid.
#[derive(Debug, Clone)]
pub struct BeamField {
    pub grid: SphereGrid,
    pub luminosity: Array2<f64>,
}

impl BeamField {
    pub fn compute(grid: &SphereGrid, beams: &[Beam], floor: f64) -> DiskResult<Self> {
        if !floor.is_finite() || floor < 0.0 {
            return Err(DiskError::ConfigError(format!(
                "beam floor must be finite and >= 0, got {floor}"
            )));
        }
        let (nth, nphi) = (grid.n_theta, grid.n_phi);
        let mut pattern = Array2::from_elem((nth, nphi), floor);

        for beam in beams {
            let (lon, lat) = beam.centre_on(grid);
            for it in 0..nth {
                let th = grid.theta[it];
                for ip in 0..nphi {
                    let d = sph_dist(lon, lat, grid.phi[ip], th);
                    pattern[[it, ip]] += beam.profile(d);
                }
            }
        }

        let integral = weighted_integral(&pattern, grid);
        if !integral.is_finite() || integral <= 0.0 {
            return Err(DiskError::NumericalDomain(format!(
                "beam pattern integral must be finite and > 0, got {integral}"
            )));
        }
        pattern /= integral;

        Ok(BeamField {
            grid: grid.clone(),
            luminosity: pattern,
        })
    }

    /// Solid-angle weighted integral of the pattern (1 after normalisation).
    pub fn integral(&self) -> f64 {
        weighted_integral(&self.luminosity, &self.grid)
    }

    pub fn nearest_cell(&self, theta: f64, phi: f64) -> DiskResult<(usize, usize)> {
        nearest_cell(&self.grid, theta, phi).ok_or(DiskError::EmptyGrid { what: "beam" })
    }

    /// Pattern value at the grid node nearest to (latitude, longitude).
    pub fn sample(&self, theta: f64, phi: f64) -> DiskResult<f64> {
        let (it, ip) = self.nearest_cell(theta, phi)?;
        Ok(self.luminosity[[it, ip]])
    }
}

fn weighted_integral(pattern: &Array2<f64>, grid: &SphereGrid) -> f64 {
    pattern
        .outer_iter()
        .zip(grid.solid_angle.iter())
        .map(|(row, &w)| row.sum() * w)
        .sum()
}
