// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Spherical Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Great-circle distance and angle bookkeeping on the unit sphere.
//!
//! Longitudes are measured in the disk plane, latitudes from the disk
//! plane toward +z, both in radians.

use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Great-circle distance between two (longitude, latitude) points.
///
/// Haversine form with `atan2`; the haversine term is clamped to [0, 1]
/// so coincident or antipodal points never produce NaN.
pub fn sph_dist(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Wrap an angle into [0, 2π).
pub fn wrap_angle(angle: f64) -> f64 {
    let w = angle.rem_euclid(TWO_PI);
    if w >= TWO_PI {
        0.0
    } else {
        w
    }
}

/// Wrap a rotation phase into [0, 1).
pub fn wrap_phase(phase: f64) -> f64 {
    let w = phase.rem_euclid(1.0);
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// Smallest absolute difference between two angles, in [0, π].
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = wrap_angle(a - b);
    d.min(TWO_PI - d)
}

/// Cartesian unit vector for a (longitude, latitude) direction.
pub fn unit_vector(lon: f64, lat: f64) -> [f64; 3] {
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}
