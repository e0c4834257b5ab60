//! Integration tests for the particle transition engine and ornaments.

use holiday_tree::ornaments::OrnamentConfig;
use holiday_tree::particles::{
    DustConfig, GoldDust, GoldenSpirals, GroundRipples, NeedleConfig, Needles, RippleConfig,
    SpiralConfig,
};
use holiday_tree::{FrameInput, OrnamentKind, OrnamentSet, ParticleSubsystem, Progress, TreeState};

const DT: f32 = 1.0 / 60.0;

fn needles() -> Needles {
    Needles::new(
        NeedleConfig {
            count: 2000,
            ..Default::default()
        },
        7,
    )
}

fn dust() -> GoldDust {
    GoldDust::new(
        DustConfig {
            count: 300,
            ..Default::default()
        },
        7,
    )
}

/// Run `frames` updates of `subsystem` toward `state`, returning the
/// progress after each one.
fn run(subsystem: &mut dyn ParticleSubsystem, state: TreeState, frames: usize, start: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let frame = FrameInput::new(DT, (start + i + 1) as f32 * DT);
            subsystem.update(&frame, state);
            subsystem.progress()
        })
        .collect()
}

// ==================== Progress ====================

#[test]
fn test_progress_converges_monotonically() {
    let mut p = Progress::new(4.0);
    let mut last = p.value();
    let mut reached = None;
    for n in 0..600 {
        let v = p.advance(1.0, DT);
        assert!(v >= last, "progress fell at frame {n}");
        assert!(v <= 1.0);
        last = v;
        if v == 1.0 && reached.is_none() {
            reached = Some(n);
        }
    }
    assert!(reached.is_some());

    let mut last = p.value();
    for _ in 0..600 {
        let v = p.advance(0.0, DT);
        assert!(v <= last);
        last = v;
    }
    assert_eq!(last, 0.0);
}

#[test]
fn test_long_frame_does_not_overshoot() {
    let mut p = Progress::new(4.0);
    assert_eq!(p.advance(1.0, 10.0), 1.0);
    assert_eq!(p.advance(0.0, 0.0), 1.0);
}

#[test]
fn test_subsystems_reveal_out_of_phase() {
    let mut n = needles();
    let mut d = dust();
    let mut s = GoldenSpirals::new(
        SpiralConfig {
            beads_per_strand: 100,
            ..Default::default()
        },
        7,
    );
    let np = run(&mut n, TreeState::Formed, 20, 0);
    let dp = run(&mut d, TreeState::Formed, 20, 0);
    let sp = run(&mut s, TreeState::Formed, 20, 0);
    // Rates 4, 3 and 2.5.
    assert!(np[19] > dp[19]);
    assert!(dp[19] > sp[19]);
    // Spiral opacity trails spiral positions.
    assert!(s.opacity() < sp[19]);
}

// ==================== Needles ====================

#[test]
fn test_needles_settle_on_the_tree_and_scatter_back() {
    let mut n = needles();
    assert_eq!(n.progress(), 0.0);
    run(&mut n, TreeState::Formed, 600, 0);
    assert_eq!(n.progress(), 1.0);

    let field = n.field();
    let amp = n.shimmer_amplitude(1.0);
    for (cur, target) in field.current().iter().zip(field.target()) {
        // Shimmer moves x and z only.
        assert!((cur.y - target.y).abs() < 1e-5);
        assert!(cur.distance(*target) <= amp * 2.0_f32.sqrt() + 1e-4);
    }

    run(&mut n, TreeState::Chaos, 600, 600);
    assert_eq!(n.progress(), 0.0);
    let field = n.field();
    for (cur, chaos) in field.current().iter().zip(field.chaos()) {
        assert!(cur.distance(*chaos) < 1e-4);
    }
}

#[test]
fn test_needle_zoom_culling_grows_with_zoom() {
    let n = needles();
    let far = n.visible_count(0.0);
    let near = n.visible_count(1.0);
    assert_eq!(near, n.len());
    assert!(far < near);
    // Roughly 40% survive when fully zoomed out.
    let fraction = far as f32 / n.len() as f32;
    assert!((0.3..0.5).contains(&fraction), "fraction {fraction}");

    let mut out = Vec::new();
    n.write_vertices(0.0, 1.0, &mut out);
    assert_eq!(out.len(), far);
}

// ==================== Dust ====================

#[test]
fn test_dust_lags_behind_its_anchor() {
    let mut d = dust();
    run(&mut d, TreeState::Formed, 10, 0);
    let mean_error: f32 = (0..d.len()).map(|i| d.anchor_error(i)).sum::<f32>() / d.len() as f32;
    assert!(mean_error > 0.1, "dust should trail its anchor, error {mean_error}");
}

#[test]
fn test_dust_settles_near_its_anchor() {
    let mut d = dust();
    run(&mut d, TreeState::Formed, 3000, 0);
    assert_eq!(d.progress(), 1.0);
    // The formed spin keeps motes slightly off the anchor (spin / spring).
    let max_error = (0..d.len()).map(|i| d.anchor_error(i)).fold(0.0, f32::max);
    assert!(max_error < 0.1, "max error {max_error}");
}

// ==================== Ripples ====================

#[test]
fn test_ripples_fade_in_and_out() {
    let mut r = GroundRipples::new(
        RippleConfig {
            count: 1000,
            ..Default::default()
        },
        7,
    );
    assert_eq!(r.opacity(), 0.0);
    assert!((0..r.len()).all(|i| r.point_alpha(i) == 0.0));

    run(&mut r, TreeState::Formed, 600, 0);
    assert_eq!(r.opacity(), 1.0);
    assert!((0..r.len()).any(|i| r.point_alpha(i) > 0.5));

    run(&mut r, TreeState::Chaos, 600, 600);
    assert_eq!(r.opacity(), 0.0);
}

// ==================== Ornaments ====================

#[test]
fn test_ornament_kind_counts_match_buffers() {
    let set = OrnamentSet::build(OrnamentConfig::default(), 3, 11);
    let counts = set.counts();
    assert_eq!(counts.total(), set.len());
    assert_eq!(counts.photos.len(), 3);
    assert!(set.photo_indices().count() > 0);

    let buffers = set.buffers();
    assert_eq!(buffers.spheres.len(), counts.spheres);
    assert_eq!(buffers.heptagrams.len(), counts.heptagrams);
    for (buffer, &count) in buffers.photos.iter().zip(&counts.photos) {
        assert_eq!(buffer.len(), count);
    }
}

#[test]
fn test_no_photos_without_urls() {
    let set = OrnamentSet::build(OrnamentConfig::default(), 0, 11);
    assert_eq!(set.photo_indices().count(), 0);
    assert!(set
        .ornaments()
        .iter()
        .all(|o| !matches!(o.kind, OrnamentKind::UserPhoto { .. })));
}

#[test]
fn test_hidden_ornaments_appear_as_tree_forms() {
    let mut set = OrnamentSet::build(OrnamentConfig::default(), 2, 11);
    let hidden: Vec<usize> = set
        .ornaments()
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.always_visible)
        .map(|(i, _)| i)
        .collect();
    assert!(!hidden.is_empty());
    // Photos are always shown.
    for i in set.photo_indices() {
        assert!(set.ornaments()[i].always_visible);
    }

    for &i in &hidden {
        assert_eq!(set.placement(i, 0.0).unwrap().scale.x, 0.0);
    }

    for n in 0..600 {
        set.advance(&FrameInput::new(DT, n as f32 * DT), TreeState::Formed);
    }
    assert_eq!(set.progress(), 1.0);
    for &i in &hidden {
        assert!(set.placement(i, 0.0).unwrap().scale.x > 0.0);
    }
}

#[test]
fn test_lifted_slot_is_hidden() {
    let mut set = OrnamentSet::build(OrnamentConfig::default(), 1, 11);
    set.resume_from(1.0);
    let photo = set.photo_indices().next().unwrap();
    set.write_instances(1.0, Some(photo));

    let orn = set.ornaments()[photo].clone();
    let slot = set.buffers().slot(orn.kind, orn.local_index).unwrap();
    assert!(slot.is_hidden());

    set.write_instances(1.0, None);
    let slot = set.buffers().slot(orn.kind, orn.local_index).unwrap();
    assert!(!slot.is_hidden());
}
