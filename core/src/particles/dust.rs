//! Gold dust: loose motes that spring-follow the interpolated anchor.
//!
//! Unlike the needles, dust integrates a velocity toward
//! `chaos*(1-p) + target*p`, so it lags behind and overshoots the anchor.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampling::{point_in_box, subsystem_rng};
use super::{FrameInput, ParticleField, ParticleSubsystem, Progress};
use crate::gesture::TreeState;

const SALT: u64 = 0x6475_7374;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DustConfig {
    pub count: usize,
    /// Extent of the chaos box.
    pub chaos_size: [f32; 3],
    /// Half-height of the helix.
    pub helix_half_height: f32,
    /// Vertical lift applied to the helix.
    pub helix_lift: f32,
    pub rate: f32,
    pub spring: f32,
    pub friction: f32,
    /// Tangential nudge applied once nearly formed.
    pub spin: f32,
    pub spin_threshold: f32,
}

impl Default for DustConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            chaos_size: [40.0, 40.0, 25.0],
            helix_half_height: 10.0,
            helix_lift: 5.0,
            rate: 3.0,
            spring: 0.01,
            friction: 0.92,
            spin: 0.0005,
            spin_threshold: 0.8,
        }
    }
}

/// Target point `i` on the double helix. Even and odd motes sit on opposite
/// strands.
pub fn helix_point(i: usize, h: f32, half_height: f32, lift: f32) -> Vec3 {
    let rel_h = (h + half_height) / (2.0 * half_height);
    let radius = (1.0 - rel_h) * 9.5 + 1.0;
    let angle = h * 2.0 + if i % 2 == 0 { 0.0 } else { PI };
    Vec3::new(angle.cos() * radius, h + lift, angle.sin() * radius)
}

pub struct GoldDust {
    config: DustConfig,
    field: ParticleField,
    velocities: Vec<Vec3>,
    progress: Progress,
}

impl GoldDust {
    pub fn new(config: DustConfig, seed: u64) -> Self {
        let mut rng = subsystem_rng(seed, SALT);
        let size = Vec3::from_array(config.chaos_size);
        let mut chaos = Vec::with_capacity(config.count);
        let mut target = Vec::with_capacity(config.count);

        for i in 0..config.count {
            chaos.push(point_in_box(&mut rng, size));
            let h = (rng.gen::<f32>() - 0.5) * 2.0 * config.helix_half_height;
            target.push(helix_point(i, h, config.helix_half_height, config.helix_lift));
        }

        let velocities = vec![Vec3::ZERO; config.count];
        let progress = Progress::new(config.rate);
        Self {
            config,
            field: ParticleField::new(chaos, target),
            velocities,
            progress,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn positions(&self) -> &[f32] {
        self.field.positions()
    }

    /// Distance from mote `i` to its current spring anchor.
    pub fn anchor_error(&self, i: usize) -> f32 {
        let anchor = self.field.anchor(i, self.progress.value());
        (self.field.current()[i] - anchor).length()
    }
}

impl ParticleSubsystem for GoldDust {
    fn name(&self) -> &'static str {
        "dust"
    }

    fn update(&mut self, frame: &FrameInput, tree_state: TreeState) {
        let p = self.progress.follow(tree_state, frame.delta);
        let spin = p > self.config.spin_threshold;
        let DustConfig {
            spring,
            friction,
            spin: spin_strength,
            ..
        } = self.config;

        for i in 0..self.velocities.len() {
            let anchor = self.field.anchor(i, p);
            let pos = self.field.current()[i];
            let mut vel = self.velocities[i] + (anchor - pos) * spring;

            if spin {
                let angle = pos.z.atan2(pos.x);
                vel.x += -angle.sin() * spin_strength;
                vel.z += angle.cos() * spin_strength;
            }

            vel *= friction;
            self.velocities[i] = vel;
            self.field.current_mut()[i] = pos + vel;
        }
    }

    fn progress(&self) -> f32 {
        self.progress.value()
    }

    fn len(&self) -> usize {
        self.field.len()
    }
}
