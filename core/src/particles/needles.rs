//! Needle cloud: the bulk of the tree silhouette.
//!
//! Needles interpolate directly between a chaos ball and a tiered pine tree
//! and pick up a small shimmer once the tree is mostly formed.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampling::{point_in_pine_tree, point_in_sphere, subsystem_rng};
use super::{FrameInput, ParticleField, ParticleSubsystem, Progress};
use crate::gesture::TreeState;
use crate::render::PointVertex;

const SALT: u64 = 0x6e65_6564;

/// Base greens; each needle picks one and jitters its lightness.
const PALETTE: [[f32; 3]; 3] = [
    [0.290, 0.871, 0.502],
    [0.133, 0.773, 0.369],
    [0.082, 0.502, 0.239],
];

/// Needle cloud configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedleConfig {
    pub count: usize,
    pub tree_height: f32,
    pub tree_radius: f32,
    pub tree_tiers: u32,
    pub chaos_radius: f32,
    pub rate: f32,
    /// Progress above which the shimmer switches on.
    pub shimmer_threshold: f32,
    /// Shimmer amplitude per unit of progress.
    pub shimmer_amplitude: f32,
}

impl Default for NeedleConfig {
    fn default() -> Self {
        Self {
            count: 220_000,
            tree_height: 19.0,
            tree_radius: 9.0,
            tree_tiers: 9,
            chaos_radius: 18.0,
            rate: 4.0,
            shimmer_threshold: 0.1,
            shimmer_amplitude: 0.05,
        }
    }
}

pub struct Needles {
    config: NeedleConfig,
    field: ParticleField,
    colors: Vec<[f32; 3]>,
    randoms: Vec<f32>,
    progress: Progress,
}

impl Needles {
    pub fn new(config: NeedleConfig, seed: u64) -> Self {
        let mut rng = subsystem_rng(seed, SALT);
        let n = config.count;
        let mut chaos = Vec::with_capacity(n);
        let mut target = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        let mut randoms = Vec::with_capacity(n);

        for _ in 0..n {
            target.push(point_in_pine_tree(
                &mut rng,
                config.tree_height,
                config.tree_radius,
                config.tree_tiers,
            ));
            chaos.push(point_in_sphere(&mut rng, config.chaos_radius));

            let pick: f32 = rng.gen();
            let base = if pick < 0.33 {
                PALETTE[0]
            } else if pick < 0.66 {
                PALETTE[1]
            } else {
                PALETTE[2]
            };
            let jitter = (rng.gen::<f32>() - 0.5) * 0.1;
            colors.push(base.map(|c| (c + jitter).clamp(0.0, 1.0)));
            randoms.push(rng.gen());
        }

        let progress = Progress::new(config.rate);
        Self {
            config,
            field: ParticleField::new(chaos, target),
            colors,
            randoms,
            progress,
        }
    }

    pub fn config(&self) -> &NeedleConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Flat xyz positions for the vertex buffer.
    pub fn positions(&self) -> &[f32] {
        self.field.positions()
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Per-needle random in [0, 1), used for zoom culling and sparkle.
    pub fn randoms(&self) -> &[f32] {
        &self.randoms
    }

    /// Shimmer amplitude at the given progress, zero until mostly formed.
    pub fn shimmer_amplitude(&self, progress: f32) -> f32 {
        if progress > self.config.shimmer_threshold {
            self.config.shimmer_amplitude * progress
        } else {
            0.0
        }
    }

    /// Whether needle `i` survives zoom culling.
    pub fn visible_at_zoom(&self, i: usize, zoom: f32) -> bool {
        self.randoms.get(i).is_some_and(|&r| r <= 0.4 + zoom * 0.6)
    }

    /// Number of needles drawn at the given zoom.
    pub fn visible_count(&self, zoom: f32) -> usize {
        let limit = 0.4 + zoom * 0.6;
        self.randoms.iter().filter(|&&r| r <= limit).count()
    }

    /// Fill `out` with the needles that survive zoom culling. Sparkle at
    /// `time` is already mixed into the colour.
    pub fn write_vertices(&self, zoom: f32, time: f32, out: &mut Vec<PointVertex>) {
        out.clear();
        let limit = 0.4 + zoom * 0.6;
        let current = self.field.current();
        for ((pos, color), &random) in current.iter().zip(&self.colors).zip(&self.randoms) {
            if random > limit {
                continue;
            }
            let sparkle = needle_sparkle(time, random) * 0.6;
            let warm = [1.0, 1.0, 0.8];
            let mixed = [0, 1, 2].map(|k| color[k] + (warm[k] - color[k]) * sparkle);
            out.push(PointVertex {
                position: pos.to_array(),
                random,
                color: [mixed[0], mixed[1], mixed[2], 0.9],
            });
        }
    }
}

impl ParticleSubsystem for Needles {
    fn name(&self) -> &'static str {
        "needles"
    }

    fn update(&mut self, frame: &FrameInput, tree_state: TreeState) {
        let p = self.progress.follow(tree_state, frame.delta);
        let amp = self.shimmer_amplitude(p);
        if amp > 0.0 {
            let t = frame.elapsed;
            self.field.blend_with(p, |target| {
                let ph = target.x * 0.5;
                Vec3::new((t * 1.5 + ph).sin() * amp, 0.0, (t * 1.8 + ph).sin() * amp)
            });
        } else {
            self.field.blend(p);
        }
    }

    fn progress(&self) -> f32 {
        self.progress.value()
    }

    fn len(&self) -> usize {
        self.field.len()
    }
}

/// Point size the needle shader computes: larger when formed and zoomed in,
/// attenuated by view depth.
pub fn needle_point_size(progress: f32, zoom: f32, depth: f32) -> f32 {
    let base = super::lerp(0.5, 1.0, progress) * 0.12 * (1.0 + zoom * 0.6);
    crate::render::point_size(base * 200.0, depth)
}

/// Sparkle weight mixed toward warm white.
pub fn needle_sparkle(time: f32, random: f32) -> f32 {
    (time * 3.0 + random * 20.0).sin().max(0.0).powi(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Needles {
        Needles::new(
            NeedleConfig {
                count: 500,
                ..Default::default()
            },
            11,
        )
    }

    #[test]
    fn test_starts_at_chaos() {
        let needles = small();
        assert_eq!(needles.field().current(), needles.field().chaos());
        assert_eq!(needles.progress(), 0.0);
    }

    #[test]
    fn test_no_shimmer_below_threshold() {
        let needles = small();
        assert_eq!(needles.shimmer_amplitude(0.05), 0.0);
        assert!((needles.shimmer_amplitude(1.0) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_formed_positions_stay_near_target() {
        let mut needles = small();
        let frame = FrameInput::new(1.0, 3.0);
        needles.update(&frame, TreeState::Formed);
        assert_eq!(needles.progress(), 1.0);
        for (cur, target) in needles.field().current().iter().zip(needles.field().target()) {
            assert!((*cur - *target).length() <= 0.05 * 2.0_f32.sqrt() + 1e-4);
            assert_eq!(cur.y, target.y);
        }
    }

    #[test]
    fn test_zoom_culling_is_monotone() {
        let needles = small();
        let far = needles.visible_count(0.0);
        let near = needles.visible_count(1.0);
        assert!(far <= near);
        assert_eq!(near, 500);

        let mut out = Vec::new();
        needles.write_vertices(0.0, 1.0, &mut out);
        assert_eq!(out.len(), far);
        assert!(out.iter().all(|v| v.random <= 0.4));
    }

    #[test]
    fn test_point_size_grows_with_progress() {
        assert!(needle_point_size(1.0, 0.5, 20.0) > needle_point_size(0.0, 0.5, 20.0));
        assert!(needle_sparkle(0.0, 0.0) >= 0.0);
    }
}
