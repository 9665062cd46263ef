//! Left-Riemann sums over tabulated spectra.
//!
//! Bin `k` spans `[x[k], x[k+1])` and carries `y[k]`; the last sample has
//! no bin. Band sums keep the bins whose left edge lies in `[lo, hi)`.

/// ∑ y[k]·(x[k+1] − x[k]) over all bins.
pub fn riemann_total(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    (0..n.saturating_sub(1))
        .map(|k| y[k] * (x[k + 1] - x[k]))
        .sum()
}

/// Same as [`riemann_total`], restricted to bins with `lo <= x[k] < hi`.
pub fn riemann_band(x: &[f64], y: &[f64], lo: f64, hi: f64) -> f64 {
    let n = x.len().min(y.len());
    (0..n.saturating_sub(1))
        .filter(|&k| x[k] >= lo && x[k] < hi)
        .map(|k| y[k] * (x[k + 1] - x[k]))
        .sum()
}

/// Bin widths `x[k+1] − x[k]`.
pub fn bin_widths(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|w| w[1] - w[0]).collect()
}
