// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Boltzmann constant (erg/K)
pub const K_BOLTZMANN_CGS: f64 = 1.3807e-16;

/// Stefan–Boltzmann constant (erg cm⁻² K⁻⁴ s⁻¹)
pub const SIGMA_SB_CGS: f64 = 5.6705e-5;

/// 1 keV in erg
pub const KEV_TO_ERG: f64 = 1.6021e-9;

/// Luminosities inside the engine are carried in units of 1e38 erg/s.
pub const LUMINOSITY_UNIT_ERG_S: f64 = 1.0e38;

/// Phase added to every disk azimuth so no element sits exactly on phase 0.
pub const DISK_PHASE_EPSILON: f64 = 1.0e-4;

/// Fraction of a grid step used to nudge a beam centre off a grid node.
pub const BEAM_NODE_EPSILON: f64 = 1.0e-4;

/// Below this projected fraction an element is treated as edge-on.
pub const MIN_FACING_FRACTION: f64 = 0.1;

/// Spectral energy grid: 1000 log-spaced bins over 0.001–100 keV.
pub const SPECTRUM_E_MIN_KEV: f64 = 1.0e-3;
pub const SPECTRUM_E_MAX_KEV: f64 = 100.0;
pub const SPECTRUM_BINS: usize = 1000;

/// Band-fraction table temperature range (K).
pub const TABLE_T_MIN_K: f64 = 1.0e4;
pub const TABLE_T_MAX_K: f64 = 1.0e8;
pub const TABLE_DEFAULT_POINTS: usize = 10_000;
