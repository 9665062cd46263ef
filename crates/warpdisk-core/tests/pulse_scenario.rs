// ─────────────────────────────────────────────────────────────────────
// SCPN Warp Disk — End-to-End Pulse Scenarios
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Full runs on reduced grids: two-beam source, warped disk, near
//! edge-on observer.

use std::time::{SystemTime, UNIX_EPOCH};

use warpdisk_core::band_table::BandTableCache;
use warpdisk_core::pulse::PulseAssembler;
use warpdisk_core::visibility::ObserverView;
use warpdisk_types::config::{BeamConfig, SimulationConfig, SpectralMode};

fn two_beam_config() -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.disk.n_points = 40;
    cfg.disk.n_profiles = 40;
    cfg.source.n_theta = 40;
    cfg.source.n_phi = 40;
    cfg.beams = vec![
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
            offset_deg: 60.0,
            norm: 3.0,
        },
    ];
    cfg.n_rotations = 8;
    cfg.observer.n_views = 4;
    cfg.spectral.table_points = 2000;
    cfg
}

fn cyclic_distance(a: usize, b: usize, n: usize) -> usize {
    let d = a.abs_diff(b) % n;
    d.min(n - d)
}

#[test]
fn hard_pulse_peaks_when_pencil_beam_faces_observer() {
    let cfg = two_beam_config();
    let assembler = PulseAssembler::from_config(&cfg).unwrap();
    let frames = assembler.frames().unwrap();
    let view = assembler
        .view(&frames, ObserverView::new((-5.0f64).to_radians(), 0.0))
        .unwrap();

    let profile = &view.profile;
    assert_eq!(profile.len(), 8);
    assert!(profile.hard.iter().all(|h| h.is_finite() && *h > 0.0));
    assert!(profile.soft.iter().all(|s| s.is_finite() && *s >= 0.0));
    let peak = profile.hard_peak_index().unwrap();
    assert!(cyclic_distance(peak, 0, 8) <= 1, "hard peak at {peak}");
}

#[test]
fn run_covers_every_view_and_frame() {
    let cfg = two_beam_config();
    let assembler = PulseAssembler::from_config(&cfg).unwrap();
    let run = assembler.run().unwrap();

    assert_eq!(run.frames.len(), 8);
    assert_eq!(run.views.len(), 4);
    for (view, phase) in run.views.iter().zip(cfg.view_phases()) {
        assert!((view.view.azimuth_phase - phase).abs() < 1e-15);
        assert_eq!(view.profile.len(), 8);
        for (s, b) in view.profile.soft.iter().zip(view.profile.soft_bolometric.iter()) {
            assert!(*s >= 0.0 && s <= b);
        }
    }

    let emitted = run.emitted();
    assert!(emitted.iter().all(|l| l.is_finite() && *l > 0.0));
    // The disk cannot reprocess more than the source puts out.
    assert!(emitted.iter().all(|l| *l < cfg.source.luminosity_38));

    let (lo, hi) = run.temperature_range().unwrap();
    assert!(lo > 0.0 && lo <= hi, "T range [{lo}, {hi}]");
    assert!(hi > 1.0e5 && hi < 1.0e9, "T range [{lo}, {hi}]");
}

#[test]
fn views_one_turn_apart_agree() {
    let cfg = two_beam_config();
    let assembler = PulseAssembler::from_config(&cfg).unwrap();
    let frames = assembler.frames().unwrap();
    let elevation = (-5.0f64).to_radians();
    let a = assembler.view(&frames, ObserverView::new(elevation, 0.375)).unwrap();
    let b = assembler.view(&frames, ObserverView::new(elevation, 1.375)).unwrap();
    assert_eq!(a.mask.visible, b.mask.visible);
    assert_eq!(a.profile.hard, b.profile.hard);
    assert_eq!(a.profile.soft, b.profile.soft);
}

#[test]
fn normalised_and_aligned_profiles() {
    let cfg = two_beam_config();
    let assembler = PulseAssembler::from_config(&cfg).unwrap();
    let frames = assembler.frames().unwrap();
    let view = assembler
        .view(&frames, ObserverView::new((-5.0f64).to_radians(), 0.67))
        .unwrap();

    let norm = view.profile.normalized();
    assert!((norm.hard.mean().unwrap() - 1.0).abs() < 1e-12);
    let aligned = norm.aligned_to_hard_peak(7);
    assert_eq!(aligned.hard_peak_index(), Some(7));
    // Rolling keeps the channels in step.
    let shift = (view.profile.hard_peak_index().unwrap() + 8 - 7) % 8;
    assert_eq!(aligned.soft, norm.rolled(shift).soft);
}

#[test]
fn exact_mode_spectra_match_band_flux() {
    let mut cfg = two_beam_config();
    cfg.n_rotations = 2;
    cfg.observer.n_views = 1;
    cfg.spectral.mode = SpectralMode::Exact;
    let assembler = PulseAssembler::from_config(&cfg).unwrap();
    let run = assembler.run().unwrap();
    let view = &run.views[0];
    let spectra = view.spectra.as_ref().unwrap();
    assert_eq!(spectra.len(), 2);
    for (spec, &bol) in spectra.iter().zip(view.profile.soft_bolometric.iter()) {
        assert!(spec.flux.iter().all(|f| f.is_finite() && *f >= 0.0));
        assert!(spec.energy_kev.windows(2).into_iter().all(|w| w[1] > w[0]));
        let total: f64 = spec
            .energy_kev
            .windows(2)
            .into_iter()
            .zip(spec.flux.iter())
            .map(|(w, f)| f * (w[1] - w[0]))
            .sum();
        assert!((total - bol).abs() <= 1e-9 * bol.max(1.0));
    }
}

#[test]
fn shared_cache_is_reused_across_runs() {
    let epoch_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "warpdisk_pulse_cache_{}_{}",
        std::process::id(),
        epoch_ns
    ));

    let mut cfg = two_beam_config();
    cfg.n_rotations = 2;
    cfg.observer.n_views = 1;
    cfg.spectral.table_points = 128;

    let cache = BandTableCache::persistent(&dir, cfg.spectral.table_points);
    let first = PulseAssembler::with_cache(&cfg, &cache).unwrap().run().unwrap();
    let second = PulseAssembler::with_cache(&cfg, &cache).unwrap().run().unwrap();
    assert_eq!(cache.build_count(), 1);
    assert_eq!(first.views[0].profile.soft, second.views[0].profile.soft);

    // A new cache over the same directory picks up the persisted table.
    let reopened = BandTableCache::persistent(&dir, cfg.spectral.table_points);
    let third = PulseAssembler::with_cache(&cfg, &reopened).unwrap().run().unwrap();
    assert_eq!(reopened.build_count(), 0);
    assert_eq!(first.views[0].profile.soft, third.views[0].profile.soft);

    std::fs::remove_dir_all(&dir).ok();
}
