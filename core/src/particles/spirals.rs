//! Golden spiral ribbons wound around the tree.
//!
//! Beads interpolate directly like the needles, but the ribbon's brightness
//! fades through a second smoothed value so it lights up a beat later than
//! the beads arrive.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampling::{phase, point_in_sphere, subsystem_rng};
use super::{lerp, FrameInput, ParticleField, ParticleSubsystem, Progress};
use crate::gesture::TreeState;

const SALT: u64 = 0x7370_6972;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiralConfig {
    pub strands: usize,
    pub beads_per_strand: usize,
    pub loops: f32,
    pub base_radius: f32,
    pub top_radius: f32,
    pub base_y: f32,
    pub span_y: f32,
    pub jitter: f32,
    pub chaos_radius: f32,
    pub rate: f32,
    pub opacity_rate: f32,
    /// Group spin in radians per second.
    pub spin_speed: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            strands: 2,
            beads_per_strand: 2000,
            loops: 3.5,
            base_radius: 9.5,
            top_radius: 0.5,
            base_y: -3.5,
            span_y: 18.0,
            jitter: 0.2,
            chaos_radius: 18.0,
            rate: 2.5,
            opacity_rate: 2.0,
            spin_speed: 0.1,
            bob_amplitude: 0.2,
            bob_frequency: 0.5,
        }
    }
}

impl SpiralConfig {
    pub fn total(&self) -> usize {
        self.strands * self.beads_per_strand
    }

    /// Un-jittered point on strand `strand` at parameter `t` in [0, 1).
    pub fn ribbon_point(&self, strand: usize, t: f32) -> Vec3 {
        let offset = TAU * strand as f32 / self.strands.max(1) as f32;
        let radius = lerp(self.base_radius, self.top_radius, t);
        let angle = t * TAU * self.loops + offset;
        Vec3::new(
            angle.cos() * radius,
            self.base_y + t * self.span_y,
            angle.sin() * radius,
        )
    }
}

/// LED-style blink in [0.6, 1.0].
pub fn twinkle(time: f32, phase: f32) -> f32 {
    let blink = (0.5 + 0.5 * (time * 4.0 + phase).sin()).powf(1.5);
    0.6 + 0.4 * blink
}

pub struct GoldenSpirals {
    config: SpiralConfig,
    field: ParticleField,
    phases: Vec<f32>,
    progress: Progress,
    opacity: Progress,
    yaw: f32,
    bob: f32,
}

impl GoldenSpirals {
    pub fn new(config: SpiralConfig, seed: u64) -> Self {
        let mut rng = subsystem_rng(seed, SALT);
        let total = config.total();
        let mut chaos = Vec::with_capacity(total);
        let mut target = Vec::with_capacity(total);
        let mut phases = Vec::with_capacity(total);

        for strand in 0..config.strands {
            for i in 0..config.beads_per_strand {
                let t = i as f32 / config.beads_per_strand as f32;
                let jitter = Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                ) * config.jitter;
                target.push(config.ribbon_point(strand, t) + jitter);
                chaos.push(point_in_sphere(&mut rng, config.chaos_radius));
                phases.push(phase(&mut rng));
            }
        }

        Self {
            progress: Progress::new(config.rate),
            opacity: Progress::new(config.opacity_rate),
            config,
            field: ParticleField::new(chaos, target),
            phases,
            yaw: 0.0,
            bob: 0.0,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn positions(&self) -> &[f32] {
        self.field.positions()
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    /// Global opacity uniform, smoothed separately from position progress.
    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Group transform: accumulated spin plus vertical bob.
    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(self.yaw), Vec3::Y * self.bob)
    }

    /// Final alpha of bead `i` at `time`.
    pub fn bead_alpha(&self, i: usize, time: f32) -> f32 {
        self.phases
            .get(i)
            .map_or(0.0, |&ph| twinkle(time, ph) * self.opacity.value())
    }
}

impl ParticleSubsystem for GoldenSpirals {
    fn name(&self) -> &'static str {
        "spirals"
    }

    fn update(&mut self, frame: &FrameInput, tree_state: TreeState) {
        let p = self.progress.follow(tree_state, frame.delta);
        self.field.blend(p);

        self.yaw = (self.yaw + frame.delta * self.config.spin_speed) % TAU;
        self.bob = (frame.elapsed * self.config.bob_frequency).sin() * self.config.bob_amplitude;
        self.opacity.follow(tree_state, frame.delta);
    }

    fn progress(&self) -> f32 {
        self.progress.value()
    }

    fn len(&self) -> usize {
        self.field.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GoldenSpirals {
        GoldenSpirals::new(
            SpiralConfig {
                beads_per_strand: 100,
                ..Default::default()
            },
            9,
        )
    }

    #[test]
    fn test_twinkle_range() {
        for k in 0..100 {
            let a = twinkle(k as f32 * 0.1, 1.3);
            assert!((0.6..=1.0 + 1e-6).contains(&a));
        }
        assert!((twinkle(0.0, std::f32::consts::FRAC_PI_2) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ribbon_tapers_upward() {
        let config = SpiralConfig::default();
        let bottom = config.ribbon_point(0, 0.0);
        let top = config.ribbon_point(0, 0.999);
        assert!((bottom.y + 3.5).abs() < 1e-6);
        assert!(Vec3::new(top.x, 0.0, top.z).length() < Vec3::new(bottom.x, 0.0, bottom.z).length());
    }

    #[test]
    fn test_opacity_lags_position() {
        let mut spirals = small();
        let frame = FrameInput::new(0.1, 0.1);
        spirals.update(&frame, TreeState::Formed);
        assert!(spirals.opacity() < spirals.progress());
        assert_eq!(spirals.len(), 200);
    }

    #[test]
    fn test_group_spins_with_time() {
        let mut spirals = small();
        for k in 1..=10 {
            spirals.update(&FrameInput::new(0.1, k as f32 * 0.1), TreeState::Formed);
        }
        assert!((spirals.yaw() - 0.1).abs() < 1e-5);
    }
}
