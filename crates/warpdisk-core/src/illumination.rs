// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Illumination Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Heating of the disk surface by the central beam pattern.
//!
//! Walking outward along each profile, an element is lit from above when
//! its warp angle exceeds every angle inside it and from below when it
//! falls under every angle inside it; otherwise the inner disk shadows it.
//! Lit elements absorb `L·Ω` and re-emit it as a blackbody:
//!
//!   T = (L_abs · 1e38 / (σ_SB · A))^(1/4)

use std::f64::consts::PI;

use ndarray::Array2;
use warpdisk_math::interp::{nearest_angle_index, nearest_index};
use warpdisk_math::stencil::{norm, profile_neighbors, surface_orientation};
use warpdisk_types::config::SourceConfig;
use warpdisk_types::constants::{LUMINOSITY_UNIT_ERG_S, SIGMA_SB_CGS};
use warpdisk_types::error::{DiskError, DiskResult};
use warpdisk_types::state::{IlluminationMap, Side, NO_TEMPERATURE};

use crate::beam::BeamField;
use crate::disk::DiskSurface;

/// Source luminosity and physical scale of the disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatingParams {
    /// Source luminosity in units of 1e38 erg/s.
    pub luminosity_38: f64,
    /// Physical length of one radius unit, in cm.
    pub inner_radius_cm: f64,
}

impl HeatingParams {
    pub fn from_config(cfg: &SourceConfig) -> Self {
        HeatingParams {
            luminosity_38: cfg.luminosity_38,
            inner_radius_cm: cfg.inner_radius_cm,
        }
    }
}

/// Blackbody temperature of a surface absorbing `absorbed` (1e38 erg/s)
/// over `area` (cm²). `None` outside the physical domain.
pub fn reprocessed_temperature(absorbed: f64, area: f64) -> Option<f64> {
    if !(absorbed > 0.0) || !(area > 0.0) {
        return None;
    }
    let t = (absorbed * LUMINOSITY_UNIT_ERG_S / (SIGMA_SB_CGS * area)).powf(0.25);
    t.is_finite().then_some(t)
}

/// Lit face of each element along one profile, from the running extremes
/// of the warp angle. The innermost element is always dark.
fn profile_sides(warp: &Array2<f64>, i: usize) -> Vec<Side> {
    let n = warp.ncols();
    let mut sides = vec![Side::Dark; n];
    let mut highest = warp[[i, 0]];
    let mut lowest = warp[[i, 0]];
    for (j, side) in sides.iter_mut().enumerate() {
        let beta = warp[[i, j]];
        if beta > highest {
            *side = Side::Top;
            highest = beta;
        }
        if beta < lowest {
            *side = Side::Bottom;
            lowest = beta;
        }
    }
    sides
}

/// Solid angle element `(i, j)` subtends at the source.
fn element_solid_angle(surface: &DiskSurface, i: usize, j: usize) -> f64 {
    let (_, n_profiles) = surface.dim();
    let (jp, jn) = profile_neighbors(j, n_profiles);
    let dbeta = 0.5 * (surface.warp[[i, jn]] - surface.warp[[i, jp]]);
    (2.0 * PI * surface.phase_step() * dbeta * surface.warp[[i, j]].cos()).abs()
}

/// Heating map for one orientation of the beam pattern.
pub fn solve_illumination(
    surface: &DiskSurface,
    field: &BeamField,
    heating: HeatingParams,
) -> DiskResult<IlluminationMap> {
    if !(heating.luminosity_38 >= 0.0) || !(heating.inner_radius_cm > 0.0) {
        return Err(DiskError::ConfigError(format!(
            "heating needs luminosity >= 0 and radius > 0, got {} and {}",
            heating.luminosity_38, heating.inner_radius_cm
        )));
    }
    let theta = field
        .grid
        .theta
        .as_slice()
        .ok_or(DiskError::EmptyGrid { what: "beam latitude" })?;
    let phi = field
        .grid
        .phi
        .as_slice()
        .ok_or(DiskError::EmptyGrid { what: "beam longitude" })?;

    let (n_points, n_profiles) = surface.dim();
    let area_scale = heating.inner_radius_cm * heating.inner_radius_cm;
    let mut map = IlluminationMap::new(n_points, n_profiles);
    let mut degenerate = 0usize;

    for i in 0..n_points {
        let ip = nearest_angle_index(phi, 2.0 * PI * surface.phase[i])
            .ok_or(DiskError::EmptyGrid { what: "beam longitude" })?;
        let sides = profile_sides(&surface.warp, i);

        for (j, side) in sides.into_iter().enumerate() {
            let omega = element_solid_angle(surface, i, j);
            map.solid_angle[[i, j]] = omega;
            if !side.is_lit() {
                continue;
            }

            let it = nearest_index(theta, surface.warp[[i, j]])
                .ok_or(DiskError::EmptyGrid { what: "beam latitude" })?;
            let flux = field.luminosity[[it, ip]] * heating.luminosity_38;
            let absorbed = flux * omega;
            let orient = surface_orientation(&surface.x, &surface.y, &surface.z, i, j);
            let area = area_scale * norm(orient);

            match reprocessed_temperature(absorbed, area) {
                Some(t) => {
                    map.side[[i, j]] = side;
                    map.absorbed[[i, j]] = absorbed;
                    map.temperature[[i, j]] = t;
                }
                None => {
                    degenerate += 1;
                    map.temperature[[i, j]] = NO_TEMPERATURE;
                }
            }
        }
    }

    if degenerate > 0 {
        log::warn!(
            "{degenerate} lit disk elements had zero flux or area and were left dark"
        );
    }
    log::debug!(
        "illumination: {} lit elements, emitted {:.4e} x1e38 erg/s",
        map.n_lit(),
        map.emitted_luminosity()
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::Beam;
    use crate::disk::DiskParams;
    use warpdisk_types::state::SphereGrid;

    fn heating() -> HeatingParams {
        HeatingParams {
            luminosity_38: 3.0,
            inner_radius_cm: 1.0e8,
        }
    }

    fn isotropic(n: usize) -> BeamField {
        let grid = SphereGrid::new(n, n).unwrap();
        BeamField::compute(&grid, &[], 1.0).unwrap()
    }

    fn surface(tilt_in: f64, tilt_out: f64, offset: f64) -> DiskSurface {
        let p = DiskParams {
            inner_radius: 0.8,
            outer_radius: 1.0,
            inner_tilt: tilt_in,
            outer_tilt: tilt_out,
            phase_offset: offset,
        };
        DiskSurface::new(p, 60, 30).unwrap()
    }

    #[test]
    fn test_flat_disk_is_dark() {
        let s = surface(0.0, 0.0, 0.0);
        let map = solve_illumination(&s, &isotropic(30), heating()).unwrap();
        assert_eq!(map.n_lit(), 0);
        assert_eq!(map.emitted_luminosity(), 0.0);
        assert_eq!(map.temperature_range(), None);
    }

    #[test]
    fn test_untwisted_warp_sides() {
        // No twist: the warp grows monotonically outward at every azimuth.
        let s = surface(5f64.to_radians(), 30f64.to_radians(), 0.0);
        let map = solve_illumination(&s, &isotropic(40), heating()).unwrap();
        let (np, nj) = map.dim();
        for i in 0..np {
            let sin = (2.0 * PI * s.phase[i]).sin();
            assert_eq!(map.side[[i, 0]], Side::Dark);
            for j in 1..nj {
                let expected = if sin < 0.0 { Side::Top } else { Side::Bottom };
                assert_eq!(map.side[[i, j]], expected, "element ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_dark_elements_carry_no_heat() {
        let s = surface(5f64.to_radians(), 30f64.to_radians(), 139f64.to_radians());
        let map = solve_illumination(&s, &isotropic(40), heating()).unwrap();
        for ((side, &l), &t) in map
            .side
            .iter()
            .zip(map.absorbed.iter())
            .zip(map.temperature.iter())
        {
            if side.is_lit() {
                assert!(l > 0.0 && t > 0.0 && t.is_finite());
            } else {
                assert_eq!(l, 0.0);
                assert_eq!(t, NO_TEMPERATURE);
            }
        }
        assert!(map.n_lit() > 0);
    }

    #[test]
    fn test_emission_scales_with_luminosity() {
        let s = surface(5f64.to_radians(), 30f64.to_radians(), 1.0);
        let field = isotropic(40);
        let one = solve_illumination(&s, &field, heating()).unwrap();
        let mut doubled = heating();
        doubled.luminosity_38 *= 2.0;
        let two = solve_illumination(&s, &field, doubled).unwrap();
        let ratio = two.emitted_luminosity() / one.emitted_luminosity();
        assert!((ratio - 2.0).abs() < 1e-12);
        // T ∝ L^(1/4)
        let (_, t1) = one.temperature_range().unwrap();
        let (_, t2) = two.temperature_range().unwrap();
        assert!((t2 / t1 - 2f64.powf(0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_beam_toward_disk_heats_more() {
        let s = surface(5f64.to_radians(), 30f64.to_radians(), 139f64.to_radians());
        let grid = SphereGrid::new(40, 40).unwrap();
        let up = Beam::new(0.0, 0.4, 0.2, 0.0, 5.0).unwrap();
        let pole = Beam::new(0.0, PI / 2.0, 0.2, 0.0, 5.0).unwrap();
        let toward = BeamField::compute(&grid, &[up], 0.1).unwrap();
        let away = BeamField::compute(&grid, &[pole], 0.1).unwrap();
        let l_toward = solve_illumination(&s, &toward, heating()).unwrap().emitted_luminosity();
        let l_away = solve_illumination(&s, &away, heating()).unwrap().emitted_luminosity();
        assert!(l_toward > l_away, "{l_toward} vs {l_away}");
    }

    #[test]
    fn test_reprocessed_temperature_domain() {
        assert_eq!(reprocessed_temperature(0.0, 1.0), None);
        assert_eq!(reprocessed_temperature(1.0, 0.0), None);
        assert_eq!(reprocessed_temperature(f64::NAN, 1.0), None);
        let t = reprocessed_temperature(1.0, 1.0e16).unwrap();
        let expected = (1.0e38 / (SIGMA_SB_CGS * 1.0e16)).powf(0.25);
        assert!((t - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_rejects_bad_heating() {
        let s = surface(0.1, 0.2, 0.0);
        let bad = HeatingParams {
            luminosity_38: 1.0,
            inner_radius_cm: 0.0,
        };
        assert!(solve_illumination(&s, &isotropic(10), bad).is_err());
    }
}
