// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — Property-Based Tests (proptest) for warpdisk-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for warpdisk-types using proptest.
//!
//! Covers: SphereGrid construction invariants, PulseProfile roll/shift
//! cyclicity, view-phase wrapping.

use std::f64::consts::PI;

use proptest::prelude::*;
use warpdisk_types::config::SimulationConfig;
use warpdisk_types::state::{PulseProfile, SphereGrid};

// ── SphereGrid Construction Invariants ───────────────────────────────

proptest! {
    /// Grid dimensions match constructor arguments.
    #[test]
    fn sphere_grid_dimensions_match(
        n_theta in 2usize..200,
        n_phi in 2usize..200,
    ) {
        let grid = SphereGrid::new(n_theta, n_phi).unwrap();
        prop_assert_eq!(grid.theta.len(), n_theta);
        prop_assert_eq!(grid.phi.len(), n_phi);
        prop_assert_eq!(grid.solid_angle.len(), n_theta);
    }

    /// Longitudes are strictly increasing and stay below 2π.
    #[test]
    fn sphere_grid_phi_monotone(n_phi in 2usize..200) {
        let grid = SphereGrid::new(10, n_phi).unwrap();
        for k in 1..n_phi {
            prop_assert!(grid.phi[k] > grid.phi[k - 1]);
        }
        prop_assert!(grid.phi[n_phi - 1] < 2.0 * PI);
        prop_assert_eq!(grid.phi[0], 0.0);
    }

    /// Cell solid angles are positive and symmetric about the equator.
    #[test]
    fn sphere_grid_solid_angle_symmetric(n_theta in 3usize..150) {
        let grid = SphereGrid::new(n_theta, 16).unwrap();
        for i in 0..n_theta {
            let mirror = n_theta - 1 - i;
            prop_assert!(grid.solid_angle[i] > 0.0);
            prop_assert!((grid.solid_angle[i] - grid.solid_angle[mirror]).abs() < 1e-12);
        }
    }
}

// ── PulseProfile Cyclicity ───────────────────────────────────────────

proptest! {
    /// Rolling by the profile length is the identity.
    #[test]
    fn pulse_roll_full_cycle_is_identity(
        values in prop::collection::vec(0.0f64..10.0, 1..64),
    ) {
        let n = values.len();
        let p = PulseProfile::new(values.clone(), values.clone(), values.clone()).unwrap();
        let r = p.rolled(n);
        prop_assert_eq!(r.hard.to_vec(), values);
    }

    /// Rolling by a then b equals rolling by a + b.
    #[test]
    fn pulse_roll_composes(
        values in prop::collection::vec(0.0f64..10.0, 1..64),
        a in 0usize..100,
        b in 0usize..100,
    ) {
        let p = PulseProfile::new(values.clone(), values.clone(), values).unwrap();
        let twice = p.rolled(a).rolled(b);
        let once = p.rolled(a + b);
        prop_assert_eq!(twice.hard.to_vec(), once.hard.to_vec());
    }

    /// Peak alignment always puts the hard maximum on the target index.
    #[test]
    fn pulse_alignment_hits_target(
        values in prop::collection::vec(0.0f64..10.0, 1..64),
        target in 0usize..64,
    ) {
        let n = values.len();
        let p = PulseProfile::new(values.clone(), values.clone(), values).unwrap();
        let aligned = p.aligned_to_hard_peak(target);
        let peak = aligned.hard_peak_index().unwrap();
        let max = aligned.hard.iter().cloned().fold(f64::MIN, f64::max);
        prop_assert_eq!(aligned.hard[target % n], max);
        prop_assert_eq!(aligned.hard[peak], max);
    }
}

// ── View Phases ──────────────────────────────────────────────────────

proptest! {
    /// All view phases lie in [0, 1) and are spaced by 1/n_views.
    #[test]
    fn view_phases_wrapped(n_views in 1usize..32, zero in -3.0f64..3.0) {
        let mut cfg = SimulationConfig::default();
        cfg.observer.n_views = n_views;
        cfg.observer.view_zero_phase = zero;
        let phases = cfg.view_phases();
        prop_assert_eq!(phases.len(), n_views);
        for p in &phases {
            prop_assert!((0.0..1.0).contains(p), "phase {} out of range", p);
        }
    }
}
