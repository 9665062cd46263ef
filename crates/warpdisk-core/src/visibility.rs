// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Visibility Mask
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Which disk elements an observer sees, and which face they show.
//!
//! The disk is turned into the observer frame (observer on +x), then
//! elements are taken nearest first. Each one still unclaimed is visible
//! and hides every unclaimed element whose projection falls inside its
//! projected cell, the outline through the midpoints of its edges.

use std::f64::consts::PI;

use ndarray::Array2;
use warpdisk_math::sphere::{unit_vector, wrap_phase};
use warpdisk_math::stencil::{norm, ring_neighbors, surface_orientation};
use warpdisk_types::constants::MIN_FACING_FRACTION;
use warpdisk_types::state::VisibilityMask;

use crate::disk::{DiskSurface, CELL_OUTLINE_VERTICES};

/// Depth difference below which grid neighbours count as level.
const LEVEL_DEPTH: f64 = 1.0e-9;

type SkyOutline = [(f64, f64); CELL_OUTLINE_VERTICES];

/// Observer direction: elevation above the disk plane (radians) and
/// azimuth in cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverView {
    pub elevation: f64,
    pub azimuth_phase: f64,
}

impl ObserverView {
    pub fn new(elevation: f64, azimuth_phase: f64) -> Self {
        ObserverView {
            elevation,
            azimuth_phase: wrap_phase(azimuth_phase),
        }
    }

    /// Unit vector toward the observer in the disk frame.
    pub fn direction(&self) -> [f64; 3] {
        unit_vector(2.0 * PI * self.azimuth_phase, self.elevation)
    }
}

/// Disk coordinates rotated so the observer lies on +x. `x` is depth
/// toward the observer; `(y, z)` is the sky plane.
#[derive(Debug, Clone)]
pub struct ObserverFrame {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub z: Array2<f64>,
    /// Sky-plane outline of each element.
    pub outline: Array2<SkyOutline>,
}

/// Turns disk-frame coordinates into the observer frame.
#[derive(Debug, Clone, Copy)]
struct Rotation {
    sa: f64,
    ca: f64,
    se: f64,
    ce: f64,
}

impl Rotation {
    fn new(view: &ObserverView) -> Self {
        let (sa, ca) = (2.0 * PI * view.azimuth_phase).sin_cos();
        let (se, ce) = view.elevation.sin_cos();
        Rotation { sa, ca, se, ce }
    }

    fn apply(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        // Azimuth first, then tip the observer down by the elevation.
        let xa = x * self.ca + y * self.sa;
        let ya = y * self.ca - x * self.sa;
        [xa * self.ce + z * self.se, ya, z * self.ce - xa * self.se]
    }
}

fn rotate_grid(
    rot: &Rotation,
    x: &Array2<f64>,
    y: &Array2<f64>,
    z: &Array2<f64>,
) -> [Array2<f64>; 3] {
    let dim = x.dim();
    let mut out = [Array2::zeros(dim), Array2::zeros(dim), Array2::zeros(dim)];
    for ((i, j), &x0) in x.indexed_iter() {
        let p = rot.apply(x0, y[[i, j]], z[[i, j]]);
        for (axis, v) in out.iter_mut().zip(p) {
            axis[[i, j]] = v;
        }
    }
    out
}

impl ObserverFrame {
    pub fn new(surface: &DiskSurface, view: &ObserverView) -> Self {
        let rot = Rotation::new(view);
        let [x, y, z] = rotate_grid(&rot, &surface.x, &surface.y, &surface.z);
        let outline = Array2::from_shape_fn(surface.dim(), |(i, j)| {
            surface.cell_outline(i, j).map(|p| {
                let [_, sy, sz] = rot.apply(p[0], p[1], p[2]);
                (sy, sz)
            })
        });
        ObserverFrame { x, y, z, outline }
    }
}

/// Sign and strength of the face each element turns to the observer.
fn facing(frame: &ObserverFrame) -> (Array2<i8>, Array2<f64>) {
    let dim = frame.x.dim();
    let mut sign = Array2::zeros(dim);
    let mut fraction = Array2::zeros(dim);
    for i in 0..dim.0 {
        for j in 0..dim.1 {
            let o = surface_orientation(&frame.x, &frame.y, &frame.z, i, j);
            let len = norm(o);
            if !(len > 0.0) {
                continue;
            }
            let f = o[0].abs() / len;
            fraction[[i, j]] = f;
            if f >= MIN_FACING_FRACTION {
                sign[[i, j]] = if o[0] > 0.0 { 1 } else { -1 };
            }
        }
    }
    (sign, fraction)
}

/// Axis-aligned box in the sky plane.
#[derive(Debug, Clone, Copy)]
struct SkyBox {
    y_min: f64,
    y_max: f64,
    z_min: f64,
    z_max: f64,
}

impl SkyBox {
    fn around(points: &[(f64, f64)]) -> Self {
        points.iter().fold(
            SkyBox {
                y_min: f64::INFINITY,
                y_max: f64::NEG_INFINITY,
                z_min: f64::INFINITY,
                z_max: f64::NEG_INFINITY,
            },
            |b, &(y, z)| SkyBox {
                y_min: b.y_min.min(y),
                y_max: b.y_max.max(y),
                z_min: b.z_min.min(z),
                z_max: b.z_max.max(z),
            },
        )
    }

    fn contains(&self, y: f64, z: f64) -> bool {
        y >= self.y_min && y <= self.y_max && z >= self.z_min && z <= self.z_max
    }
}

/// Even-odd crossing test; also handles cells folded by foreshortening.
fn cell_contains(cell: &[(f64, f64)], y: f64, z: f64) -> bool {
    let mut inside = false;
    let mut k = cell.len() - 1;
    for m in 0..cell.len() {
        let (ym, zm) = cell[m];
        let (yk, zk) = cell[k];
        if (zm > z) != (zk > z) {
            let y_cross = ym + (z - zm) * (yk - ym) / (zk - zm);
            if y < y_cross {
                inside = !inside;
            }
        }
        k = m;
    }
    inside
}

/// Uniform bucket grid over the sky-plane footprint, so each cell query
/// only touches elements projected nearby.
struct SkyBuckets {
    y0: f64,
    z0: f64,
    dy: f64,
    dz: f64,
    n: usize,
    members: Vec<Vec<(usize, usize)>>,
}

impl SkyBuckets {
    fn new(frame: &ObserverFrame) -> Self {
        let count = frame.y.len();
        let n = ((count as f64).sqrt().ceil() as usize).max(1);
        let fold = |a: &Array2<f64>| {
            a.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
        };
        let (y0, y1) = fold(&frame.y);
        let (z0, z1) = fold(&frame.z);
        let dy = ((y1 - y0) / n as f64).max(f64::MIN_POSITIVE);
        let dz = ((z1 - z0) / n as f64).max(f64::MIN_POSITIVE);

        let mut buckets = SkyBuckets {
            y0,
            z0,
            dy,
            dz,
            n,
            members: vec![Vec::new(); n * n],
        };
        for ((i, j), &y) in frame.y.indexed_iter() {
            let by = buckets.slot(y, buckets.y0, buckets.dy);
            let bz = buckets.slot(frame.z[[i, j]], buckets.z0, buckets.dz);
            buckets.members[by * n + bz].push((i, j));
        }
        buckets
    }

    fn slot(&self, v: f64, origin: f64, step: f64) -> usize {
        let k = ((v - origin) / step).floor();
        if k.is_nan() || k <= 0.0 {
            0
        } else {
            (k as usize).min(self.n - 1)
        }
    }

    fn query(&self, area: &SkyBox) -> impl Iterator<Item = &(usize, usize)> + '_ {
        let by0 = self.slot(area.y_min, self.y0, self.dy);
        let by1 = self.slot(area.y_max, self.y0, self.dy);
        let bz0 = self.slot(area.z_min, self.z0, self.dz);
        let bz1 = self.slot(area.z_max, self.z0, self.dz);
        (by0..=by1).flat_map(move |by| {
            (bz0..=bz1).flat_map(move |bz| self.members[by * self.n + bz].iter())
        })
    }
}

/// Direct grid neighbours at the same depth, which never hide each other.
fn level_neighbours(
    frame: &ObserverFrame,
    (i, j): (usize, usize),
    (a, b): (usize, usize),
) -> bool {
    let (prev, next) = ring_neighbors(i, frame.x.nrows());
    let adjacent = (b == j && (a == prev || a == next)) || (a == i && b.abs_diff(j) == 1);
    adjacent && frame.x[[i, j]] - frame.x[[a, b]] <= LEVEL_DEPTH
}

/// Nearest-first occlusion. Ties in depth resolve by grid index, so the
/// result does not depend on sort stability.
fn occlusion(frame: &ObserverFrame) -> Array2<bool> {
    let dim = frame.x.dim();
    let mut order: Vec<(usize, usize)> = frame.x.indexed_iter().map(|(ij, _)| ij).collect();
    order.sort_by(|a, b| {
        frame.x[[b.0, b.1]]
            .total_cmp(&frame.x[[a.0, a.1]])
            .then(a.cmp(b))
    });

    let buckets = SkyBuckets::new(frame);
    let mut resolved = Array2::from_elem(dim, false);
    let mut visible = Array2::from_elem(dim, false);

    for &(i, j) in &order {
        if resolved[[i, j]] {
            continue;
        }
        resolved[[i, j]] = true;
        visible[[i, j]] = true;

        let cell = &frame.outline[[i, j]];
        let bounds = SkyBox::around(cell);
        for &(a, b) in buckets.query(&bounds) {
            if resolved[[a, b]] || level_neighbours(frame, (i, j), (a, b)) {
                continue;
            }
            let (y, z) = (frame.y[[a, b]], frame.z[[a, b]]);
            if bounds.contains(y, z) && cell_contains(cell, y, z) {
                resolved[[a, b]] = true;
            }
        }
    }
    visible
}

/// Hide single visible elements whose radial neighbours are both hidden.
/// Decisions use the unsmoothed mask.
fn remove_islands(visible: &mut Array2<bool>) {
    let before = visible.clone();
    let (n_points, n_profiles) = before.dim();
    for i in 0..n_points {
        for j in 1..n_profiles.saturating_sub(1) {
            if !before[[i, j - 1]] && !before[[i, j + 1]] {
                visible[[i, j]] = false;
            }
        }
    }
}

pub fn compute_visibility(surface: &DiskSurface, view: &ObserverView) -> VisibilityMask {
    let frame = ObserverFrame::new(surface, view);
    let (facing, facing_fraction) = facing(&frame);
    let mut visible = occlusion(&frame);
    remove_islands(&mut visible);

    log::debug!(
        "visibility at azimuth {:.4}: {} of {} elements unoccluded",
        view.azimuth_phase,
        visible.iter().filter(|&&v| v).count(),
        visible.len()
    );

    VisibilityMask {
        elevation: view.elevation,
        azimuth_phase: view.azimuth_phase,
        visible,
        facing,
        facing_fraction,
    }
}
