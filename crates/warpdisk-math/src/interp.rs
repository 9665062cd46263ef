//! Nearest-node lookup and linear interpolation on uniform grids.

use warpdisk_types::state::SphereGrid;

use crate::sphere::angle_diff;

/// Interpolation weights closer than this to a node snap onto the node, so
/// tabulated values are reproduced exactly there.
pub const NODE_SNAP: f64 = 1e-9;

/// Index of the grid value nearest to `value` (first one on ties).
/// `None` for an empty grid.
pub fn nearest_index(grid: &[f64], value: f64) -> Option<usize> {
    grid.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &g)| {
            let d = (g - value).abs();
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            }
        })
        .map(|(i, _)| i)
}

/// Like [`nearest_index`] but measures wrapped angular distance.
pub fn nearest_angle_index(grid: &[f64], angle: f64) -> Option<usize> {
    grid.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &g)| {
            let d = angle_diff(g, angle);
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            }
        })
        .map(|(i, _)| i)
}

/// `(theta_index, phi_index)` of the sphere cell nearest to a direction.
pub fn nearest_cell(grid: &SphereGrid, theta: f64, phi: f64) -> Option<(usize, usize)> {
    let it = nearest_index(grid.theta.as_slice()?, theta)?;
    let ip = nearest_angle_index(grid.phi.as_slice()?, phi)?;
    Some((it, ip))
}

/// Linear interpolation of `values` sampled at `x0 + k·dx`.
///
/// Outside the grid the end values are returned. Returns `None` for an
/// empty table, a non-positive step or a non-finite abscissa.
pub fn interp_uniform(x0: f64, dx: f64, values: &[f64], x: f64) -> Option<f64> {
    let n = values.len();
    if n == 0 || !x.is_finite() || !dx.is_finite() || dx <= 0.0 {
        return None;
    }
    if n == 1 {
        return Some(values[0]);
    }

    let t = (x - x0) / dx;
    if t <= 0.0 {
        return Some(values[0]);
    }
    if t >= (n - 1) as f64 {
        return Some(values[n - 1]);
    }

    let i = (t.floor() as usize).min(n - 2);
    let f = t - i as f64;
    if f < NODE_SNAP {
        return Some(values[i]);
    }
    if f > 1.0 - NODE_SNAP {
        return Some(values[i + 1]);
    }
    Some((1.0 - f) * values[i] + f * values[i + 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_nearest_index_basic() {
        let grid = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(nearest_index(&grid, 1.2), Some(1));
        assert_eq!(nearest_index(&grid, -5.0), Some(0));
        assert_eq!(nearest_index(&grid, 99.0), Some(3));
        // Ties resolve to the first node.
        assert_eq!(nearest_index(&grid, 1.5), Some(1));
    }

    #[test]
    fn test_nearest_index_empty() {
        assert_eq!(nearest_index(&[], 1.0), None);
        assert_eq!(nearest_angle_index(&[], 1.0), None);
    }

    #[test]
    fn test_nearest_angle_index_wraps() {
        let grid: Vec<f64> = (0..8).map(|k| k as f64 * PI / 4.0).collect();
        // Just below 2π is nearest to 0, not to 7π/4.
        assert_eq!(nearest_angle_index(&grid, 2.0 * PI - 0.01), Some(0));
        assert_eq!(nearest_angle_index(&grid, -0.01), Some(0));
        assert_eq!(nearest_angle_index(&grid, PI + 0.1), Some(4));
    }

    #[test]
    fn test_nearest_cell_on_sphere_grid() {
        let grid = SphereGrid::new(19, 36).unwrap();
        let (it, ip) = nearest_cell(&grid, 0.0, 2.0 * PI - 1e-3).unwrap();
        assert_eq!(it, 9);
        assert_eq!(ip, 0);
    }

    #[test]
    fn test_interp_uniform_nodes_exact() {
        let values = [0.1, 0.7, 0.3, 0.9];
        for (k, &v) in values.iter().enumerate() {
            let x = 2.0 + 0.5 * k as f64;
            assert_eq!(interp_uniform(2.0, 0.5, &values, x), Some(v));
        }
    }

    #[test]
    fn test_interp_uniform_linear_and_clamped() {
        let values = [0.0, 10.0, 20.0];
        let v = interp_uniform(0.0, 1.0, &values, 1.25).unwrap();
        assert!((v - 12.5).abs() < 1e-12);
        assert_eq!(interp_uniform(0.0, 1.0, &values, -3.0), Some(0.0));
        assert_eq!(interp_uniform(0.0, 1.0, &values, 9.0), Some(20.0));
    }

    #[test]
    fn test_interp_uniform_rejects_bad_input() {
        assert_eq!(interp_uniform(0.0, 1.0, &[], 0.5), None);
        assert_eq!(interp_uniform(0.0, 0.0, &[1.0, 2.0], 0.5), None);
        assert_eq!(interp_uniform(0.0, 1.0, &[1.0, 2.0], f64::NAN), None);
    }
}
