//! Particle transition engine.
//!
//! Every particle subsystem follows one contract: a per-subsystem smoothed
//! [`Progress`] chases the tree state's target (1 formed, 0 chaos), and each
//! particle is placed between its precomputed chaos and target positions by
//! that progress. Subsystems own their own rate, so they reveal out of phase
//! with each other.
//!
//! Subsystems:
//! - Needles: direct interpolation plus a settling shimmer
//! - Dust: spring-follows the interpolated anchor (lag and overshoot)
//! - Spirals: direct interpolation, separate opacity fade, twinkle
//! - Ripples: static ground disc revealed by progress
//! - Ambient: time-driven drift, independent of tree state

pub mod ambient;
pub mod dust;
pub mod needles;
pub mod ripples;
pub mod sampling;
pub mod spirals;

pub use ambient::{AmbientConfig, AmbientField, AmbientLayer};
pub use dust::{DustConfig, GoldDust};
pub use needles::{NeedleConfig, Needles};
pub use ripples::{GroundRipples, RippleConfig};
pub use spirals::{GoldenSpirals, SpiralConfig};

use glam::Vec3;

use crate::gesture::TreeState;

/// Once this close to its target, progress snaps onto it.
pub const PROGRESS_SNAP_EPSILON: f32 = 1e-4;

/// Timing for one render frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds since the scene started.
    pub elapsed: f32,
}

impl FrameInput {
    pub fn new(delta: f32, elapsed: f32) -> Self {
        Self { delta, elapsed }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite step: 0 below `edge0`, 1 above `edge1`, cubic in between.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Per-frame blend factor for `lerp(x, target, rate * delta)`, clamped so a
/// long frame cannot carry the value past its target.
#[inline]
pub fn smoothing_factor(rate: f32, delta: f32) -> f32 {
    (rate * delta).clamp(0.0, 1.0)
}

/// Exponentially smoothed scalar in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    value: f32,
    rate: f32,
}

impl Progress {
    pub fn new(rate: f32) -> Self {
        Self::starting_at(rate, 0.0)
    }

    pub fn starting_at(rate: f32, value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            rate,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Move toward `target` by one frame.
    pub fn advance(&mut self, target: f32, delta: f32) -> f32 {
        self.value = lerp(self.value, target, smoothing_factor(self.rate, delta));
        if (target - self.value).abs() < PROGRESS_SNAP_EPSILON {
            self.value = target;
        }
        self.value
    }

    /// Move toward the tree state's target by one frame.
    pub fn follow(&mut self, state: TreeState, delta: f32) -> f32 {
        self.advance(state.target_progress(), delta)
    }
}

/// Struct-of-arrays storage shared by the interpolating subsystems.
///
/// Allocated once at construction and never resized.
#[derive(Debug, Clone)]
pub struct ParticleField {
    chaos: Vec<Vec3>,
    target: Vec<Vec3>,
    current: Vec<Vec3>,
}

impl ParticleField {
    /// Build from paired chaos/target samples. Current starts at chaos.
    pub fn new(chaos: Vec<Vec3>, target: Vec<Vec3>) -> Self {
        debug_assert_eq!(chaos.len(), target.len());
        let current = chaos.clone();
        Self {
            chaos,
            target,
            current,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn chaos(&self) -> &[Vec3] {
        &self.chaos
    }

    pub fn target(&self) -> &[Vec3] {
        &self.target
    }

    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut [Vec3] {
        &mut self.current
    }

    /// Interpolated (chaos→target) position of one particle.
    #[inline]
    pub fn anchor(&self, i: usize, progress: f32) -> Vec3 {
        self.chaos[i] * (1.0 - progress) + self.target[i] * progress
    }

    /// Recompute every current position from scratch.
    pub fn blend(&mut self, progress: f32) {
        let inv = 1.0 - progress;
        for ((cur, chaos), target) in self.current.iter_mut().zip(&self.chaos).zip(&self.target) {
            *cur = *chaos * inv + *target * progress;
        }
    }

    /// Blend, then displace each particle by `offset(target)`.
    pub fn blend_with<F>(&mut self, progress: f32, mut offset: F)
    where
        F: FnMut(Vec3) -> Vec3,
    {
        let inv = 1.0 - progress;
        for ((cur, chaos), target) in self.current.iter_mut().zip(&self.chaos).zip(&self.target) {
            *cur = *chaos * inv + *target * progress + offset(*target);
        }
    }

    /// Flat xyz view for upload as a vertex buffer.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.current)
    }
}

/// Common per-frame interface of every particle subsystem.
pub trait ParticleSubsystem {
    /// Short identifier for logs and benchmarks.
    fn name(&self) -> &'static str;

    /// Advance by one render frame.
    fn update(&mut self, frame: &FrameInput, tree_state: TreeState);

    /// Current smoothed progress.
    fn progress(&self) -> f32;

    /// Number of particles owned.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.1, 0.9, 0.0), 0.0);
        assert_eq!(smoothstep(0.1, 0.9, 0.1), 0.0);
        assert_eq!(smoothstep(0.1, 0.9, 0.9), 1.0);
        assert_eq!(smoothstep(0.1, 0.9, 1.0), 1.0);
        assert!((smoothstep(0.1, 0.9, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_progress_long_frame_does_not_overshoot() {
        let mut p = Progress::new(4.0);
        assert_eq!(p.advance(1.0, 2.0), 1.0);
        assert_eq!(p.advance(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_progress_converges_exactly() {
        let mut p = Progress::new(4.0);
        let mut last = 0.0;
        for _ in 0..2000 {
            let v = p.advance(1.0, 1.0 / 60.0);
            assert!(v >= last && v <= 1.0);
            last = v;
        }
        assert_eq!(p.value(), 1.0);
    }

    #[test]
    fn test_blend_endpoints() {
        let mut field = ParticleField::new(vec![Vec3::ZERO], vec![Vec3::ONE]);
        field.blend(1.0);
        assert_eq!(field.current()[0], Vec3::ONE);
        field.blend(0.25);
        assert!((field.current()[0] - Vec3::splat(0.25)).length() < 1e-6);
        assert_eq!(field.positions().len(), 3);
    }
}
