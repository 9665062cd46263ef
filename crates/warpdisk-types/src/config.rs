// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants::TABLE_DEFAULT_POINTS;
use crate::error::{DiskError, DiskResult};

/// Top-level simulation configuration.
/// Angles are given in degrees; the engine converts to radians.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub disk: DiskConfig,
    pub beams: Vec<BeamConfig>,
    pub source: SourceConfig,
    pub observer: ObserverConfig,
    #[serde(default = "default_n_rotations")]
    pub n_rotations: usize,
    #[serde(default)]
    pub spectral: SpectralConfig,
}

/// Warped disk geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub inner_tilt_deg: f64,
    pub outer_tilt_deg: f64,
    /// Precession lag between the inner and outer edge.
    pub phase_offset_deg: f64,
    #[serde(default = "default_grid_points")]
    pub n_points: usize,
    #[serde(default = "default_grid_points")]
    pub n_profiles: usize,
}

/// One Gaussian beam lobe on the neutron-star sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamConfig {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    /// Gaussian sigma of the lobe.
    pub width_deg: f64,
    /// Angular distance of the lobe ridge from the beam centre (0 = pencil).
    #[serde(default)]
    pub offset_deg: f64,
    pub norm: f64,
}

/// Central source and its angular sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Uniform floor added to the beam pattern before normalization.
    pub floor: f64,
    /// Physical inner disk radius (cm); disk coordinates are in these units.
    pub inner_radius_cm: f64,
    /// Total hard luminosity in units of 1e38 erg/s.
    pub luminosity_38: f64,
    #[serde(default = "default_grid_points")]
    pub n_theta: usize,
    #[serde(default = "default_grid_points")]
    pub n_phi: usize,
}

/// Viewing geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    pub elevation_deg: f64,
    /// Number of viewing azimuths swept around the disk.
    #[serde(default = "default_n_views")]
    pub n_views: usize,
    /// Azimuth phase of the first view; later views step backwards by 1/n_views.
    #[serde(default = "default_view_zero_phase")]
    pub view_zero_phase: f64,
}

/// How disk emission is reduced to a band flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralMode {
    /// Interpolate a cached band-fraction table.
    Fast,
    /// Sum full blackbody spectra, then integrate the band.
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralConfig {
    #[serde(default = "default_band_low")]
    pub band_low_kev: f64,
    #[serde(default = "default_band_high")]
    pub band_high_kev: f64,
    #[serde(default = "default_mode")]
    pub mode: SpectralMode,
    #[serde(default = "default_table_points")]
    pub table_points: usize,
    /// Directory holding persisted band tables. Memory-only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
}

fn default_n_rotations() -> usize {
    128
}
fn default_grid_points() -> usize {
    100
}
fn default_n_views() -> usize {
    8
}
fn default_view_zero_phase() -> f64 {
    0.67
}
fn default_band_low() -> f64 {
    0.6
}
fn default_band_high() -> f64 {
    10.0
}
fn default_mode() -> SpectralMode {
    SpectralMode::Fast
}
fn default_table_points() -> usize {
    TABLE_DEFAULT_POINTS
}

impl Default for SpectralConfig {
    fn default() -> Self {
        SpectralConfig {
            band_low_kev: default_band_low(),
            band_high_kev: default_band_high(),
            mode: default_mode(),
            table_points: default_table_points(),
            cache_dir: None,
        }
    }
}

impl Default for SimulationConfig {
    /// Reference pencil-beam run.
    fn default() -> Self {
        SimulationConfig {
            disk: DiskConfig {
                inner_radius: 0.8,
                outer_radius: 1.0,
                inner_tilt_deg: 5.0,
                outer_tilt_deg: 30.0,
                phase_offset_deg: 139.0,
                n_points: default_grid_points(),
                n_profiles: default_grid_points(),
            },
            beams: vec![
                BeamConfig {
                    longitude_deg: 0.0,
                    latitude_deg: 0.0,
                    width_deg: 18.0,
                    offset_deg: 0.0,
                    norm: 3.0,
                },
                BeamConfig {
                    longitude_deg: 180.0,
                    latitude_deg: 60.0,
                    width_deg: 90.0,
                    offset_deg: 0.0,
                    norm: 3.0,
                },
            ],
            source: SourceConfig {
                floor: 1.0,
                inner_radius_cm: 1.0e8,
                luminosity_38: 3.0,
                n_theta: default_grid_points(),
                n_phi: default_grid_points(),
            },
            observer: ObserverConfig {
                elevation_deg: -5.0,
                n_views: default_n_views(),
                view_zero_phase: default_view_zero_phase(),
            },
            n_rotations: default_n_rotations(),
            spectral: SpectralConfig::default(),
        }
    }
}

fn require_finite(name: &str, value: f64) -> DiskResult<()> {
    if !value.is_finite() {
        return Err(DiskError::ConfigError(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

fn require_positive(name: &str, value: f64) -> DiskResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DiskError::ConfigError(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

impl SimulationConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> DiskResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DiskResult<()> {
        let disk = &self.disk;
        require_positive("disk.inner_radius", disk.inner_radius)?;
        require_positive("disk.outer_radius", disk.outer_radius)?;
        if disk.outer_radius <= disk.inner_radius {
            return Err(DiskError::ConfigError(format!(
                "disk.outer_radius ({}) must exceed disk.inner_radius ({})",
                disk.outer_radius, disk.inner_radius
            )));
        }
        require_finite("disk.inner_tilt_deg", disk.inner_tilt_deg)?;
        require_finite("disk.outer_tilt_deg", disk.outer_tilt_deg)?;
        require_finite("disk.phase_offset_deg", disk.phase_offset_deg)?;
        if disk.n_points < 3 || disk.n_profiles < 3 {
            return Err(DiskError::ConfigError(format!(
                "disk grid must be at least 3x3, got {}x{}",
                disk.n_points, disk.n_profiles
            )));
        }

        if self.beams.is_empty() {
            return Err(DiskError::ConfigError(
                "at least one beam is required".to_string(),
            ));
        }
        for (i, beam) in self.beams.iter().enumerate() {
            require_finite(&format!("beams[{i}].longitude_deg"), beam.longitude_deg)?;
            require_finite(&format!("beams[{i}].latitude_deg"), beam.latitude_deg)?;
            require_positive(&format!("beams[{i}].width_deg"), beam.width_deg)?;
            require_finite(&format!("beams[{i}].offset_deg"), beam.offset_deg)?;
            require_finite(&format!("beams[{i}].norm"), beam.norm)?;
            if beam.latitude_deg.abs() > 90.0 {
                return Err(DiskError::ConfigError(format!(
                    "beams[{i}].latitude_deg must lie in [-90, 90], got {}",
                    beam.latitude_deg
                )));
            }
        }

        let src = &self.source;
        require_positive("source.floor", src.floor)?;
        require_positive("source.inner_radius_cm", src.inner_radius_cm)?;
        require_positive("source.luminosity_38", src.luminosity_38)?;
        if src.n_theta < 2 || src.n_phi < 2 {
            return Err(DiskError::ConfigError(format!(
                "beam grid must be at least 2x2, got {}x{}",
                src.n_theta, src.n_phi
            )));
        }

        require_finite("observer.elevation_deg", self.observer.elevation_deg)?;
        require_finite("observer.view_zero_phase", self.observer.view_zero_phase)?;
        if self.observer.n_views == 0 {
            return Err(DiskError::ConfigError(
                "observer.n_views must be >= 1".to_string(),
            ));
        }
        if self.n_rotations == 0 {
            return Err(DiskError::ConfigError(
                "n_rotations must be >= 1".to_string(),
            ));
        }

        let sp = &self.spectral;
        require_positive("spectral.band_low_kev", sp.band_low_kev)?;
        require_positive("spectral.band_high_kev", sp.band_high_kev)?;
        if sp.band_high_kev <= sp.band_low_kev {
            return Err(DiskError::ConfigError(format!(
                "spectral band must satisfy low < high, got [{}, {}]",
                sp.band_low_kev, sp.band_high_kev
            )));
        }
        if sp.table_points < 2 {
            return Err(DiskError::ConfigError(format!(
                "spectral.table_points must be >= 2, got {}",
                sp.table_points
            )));
        }
        Ok(())
    }

    /// Azimuth phases of the observer views, each wrapped into [0, 1).
    pub fn view_phases(&self) -> Vec<f64> {
        let n = self.observer.n_views;
        (0..n)
            .map(|k| {
                let p = (self.observer.view_zero_phase - k as f64 / n as f64).rem_euclid(1.0);
                // rem_euclid rounds tiny negatives up to exactly 1.0
                if p >= 1.0 {
                    0.0
                } else {
                    p
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = SimulationConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.beams.len(), 2);
        assert_eq!(cfg.n_rotations, 128);
        assert_eq!(cfg.spectral.mode, SpectralMode::Fast);
        assert!((cfg.spectral.band_low_kev - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_view_phases_wrap() {
        let cfg = SimulationConfig::default();
        let phases = cfg.view_phases();
        assert_eq!(phases.len(), 8);
        assert!((phases[0] - 0.67).abs() < 1e-12);
        // 0.67 - 6/8 = -0.08 wraps to 0.92
        assert!((phases[6] - 0.92).abs() < 1e-12);
        assert!(phases.iter().all(|p| (0.0..1.0).contains(p)));
    }

    #[test]
    fn test_json_defaults_fill_in() {
        let json = r#"{
            "disk": {"inner_radius": 0.8, "outer_radius": 1.0,
                     "inner_tilt_deg": 5.0, "outer_tilt_deg": 30.0,
                     "phase_offset_deg": 139.0},
            "beams": [{"longitude_deg": 0.0, "latitude_deg": 0.0,
                       "width_deg": 18.0, "norm": 3.0}],
            "source": {"floor": 1.0, "inner_radius_cm": 1e8, "luminosity_38": 3.0},
            "observer": {"elevation_deg": -5.0},
            "spectral": {"mode": "exact"}
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.disk.n_points, 100);
        assert_eq!(cfg.source.n_phi, 100);
        assert_eq!(cfg.observer.n_views, 8);
        assert_eq!(cfg.spectral.mode, SpectralMode::Exact);
        assert!((cfg.spectral.band_high_kev - 10.0).abs() < 1e-12);
        assert_eq!(cfg.beams[0].offset_deg, 0.0);
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = SimulationConfig::default();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.beams.len(), cfg2.beams.len());
        assert_eq!(cfg.disk.n_profiles, cfg2.disk.n_profiles);
        assert_eq!(cfg.spectral.mode, cfg2.spectral.mode);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let mut cfg = SimulationConfig::default();
        cfg.spectral.band_low_kev = 10.0;
        cfg.spectral.band_high_kev = 0.6;
        assert!(matches!(cfg.validate(), Err(DiskError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_missing_beams_and_bad_floor() {
        let mut cfg = SimulationConfig::default();
        cfg.beams.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = SimulationConfig::default();
        cfg.source.floor = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let path = std::env::temp_dir().join("warpdisk_config_does_not_exist.json");
        let err = SimulationConfig::from_file(&path.to_string_lossy()).unwrap_err();
        assert!(matches!(err, DiskError::Io(_)));
    }
}
