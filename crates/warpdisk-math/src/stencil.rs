// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Surface Stencil
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Central-difference stencils on the `[point, profile]` disk grid.
//!
//! The point (azimuthal) axis is periodic. The profile (radial) axis is
//! not: the first and last rows fall back to one-sided pairs.

use ndarray::Array2;

/// Azimuthal neighbours `(i - 1, i + 1)` with wrap-around.
pub fn ring_neighbors(i: usize, n: usize) -> (usize, usize) {
    let prev = if i == 0 { n - 1 } else { i - 1 };
    let next = if i + 1 == n { 0 } else { i + 1 };
    (prev, next)
}

/// Radial neighbours `(j - 1, j + 1)`, one-sided at the inner and outer edge.
pub fn profile_neighbors(j: usize, n: usize) -> (usize, usize) {
    if j == 0 {
        (0, 1.min(n - 1))
    } else if j + 1 >= n {
        (n - 2, n - 1)
    } else {
        (j - 1, j + 1)
    }
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Unnormalised surface normal of element `(i, j)`.
///
/// Cross product of the radial tangent (across the profile neighbours) with
/// the azimuthal tangent (across the ring neighbours). Its magnitude scales
/// with the element area; for a flat disk with increasing azimuth it points
/// along +z.
pub fn surface_orientation(
    x: &Array2<f64>,
    y: &Array2<f64>,
    z: &Array2<f64>,
    i: usize,
    j: usize,
) -> [f64; 3] {
    let (n_points, n_profiles) = x.dim();
    let (ip, in_) = ring_neighbors(i, n_points);
    let (jp, jn) = profile_neighbors(j, n_profiles);

    let radial = [
        x[[i, jn]] - x[[i, jp]],
        y[[i, jn]] - y[[i, jp]],
        z[[i, jn]] - z[[i, jp]],
    ];
    let azimuthal = [
        x[[in_, j]] - x[[ip, j]],
        y[[in_, j]] - y[[ip, j]],
        z[[in_, j]] - z[[ip, j]],
    ];
    cross(radial, azimuthal)
}
