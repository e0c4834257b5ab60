//! Tree group spin driven by rotation impulses.

use serde::{Deserialize, Serialize};

use crate::gesture::TreeState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Fraction of each incoming impulse added to the spin velocity.
    pub impulse_gain: f32,
    /// Per-frame velocity damping.
    pub damping: f32,
    /// Below this speed a formed tree eases into its idle drift.
    pub idle_threshold: f32,
    pub idle_velocity: f32,
    pub idle_ease: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            impulse_gain: 0.15,
            damping: 0.85,
            idle_threshold: 0.001,
            idle_velocity: 0.00005,
            idle_ease: 0.01,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeRotation {
    config: RotationConfig,
    velocity: f32,
    yaw: f32,
}

impl TreeRotation {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            velocity: 0.0,
            yaw: 0.0,
        }
    }

    /// Group yaw in radians (unbounded).
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Spin in radians per frame.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Advance one frame. Impulses are ignored while a photo is focused so
    /// the focused ornament does not swing away.
    pub fn update(&mut self, impulse: f32, tree_state: TreeState, focused: bool) -> f32 {
        let c = &self.config;
        if !focused {
            self.velocity += impulse * c.impulse_gain;
        }
        self.velocity *= c.damping;
        if tree_state == TreeState::Formed && self.velocity.abs() < c.idle_threshold && !focused {
            self.velocity += (c.idle_velocity - self.velocity) * c.idle_ease;
        }
        self.yaw += self.velocity;
        self.yaw
    }
}

impl Default for TreeRotation {
    fn default() -> Self {
        Self::new(RotationConfig::default())
    }
}
