//! Ambient gold motes and snow surrounding the scene.
//!
//! Both layers drift purely as a function of elapsed time and ignore the
//! tree state entirely.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampling::{point_in_shell, subsystem_rng};

const GOLD_SALT: u64 = 0x676f_6c64;
const SNOW_SALT: u64 = 0x736e_6f77;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmbientLayer {
    /// Slowly orbiting, twinkling gold motes in a wide shell.
    Gold,
    /// Falling snow wrapped in a vertical column.
    Snow,
}

impl AmbientLayer {
    pub fn name(&self) -> &'static str {
        match self {
            AmbientLayer::Gold => "gold",
            AmbientLayer::Snow => "snow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientConfig {
    pub gold_count: usize,
    pub gold_inner_radius: f32,
    pub gold_outer_radius: f32,
    pub gold_drift: f32,
    /// Gold group spin in radians per second.
    pub gold_spin: f32,
    pub snow_count: usize,
    pub snow_inner_radius: f32,
    pub snow_outer_radius: f32,
    pub snow_column_height: f32,
    pub snow_fall_speed: f32,
    pub snow_drift: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            gold_count: 2500,
            gold_inner_radius: 30.0,
            gold_outer_radius: 90.0,
            gold_drift: 2.0,
            gold_spin: 0.03,
            snow_count: 120_000,
            snow_inner_radius: 20.0,
            snow_outer_radius: 100.0,
            snow_column_height: 60.0,
            snow_fall_speed: 1.5,
            snow_drift: 1.5,
        }
    }
}

/// Gold mote displacement at `time`.
pub fn gold_drift(base: Vec3, time: f32, offset: f32, amplitude: f32) -> Vec3 {
    let speed = 0.2;
    base + Vec3::new(
        (time * speed + offset).sin() * amplitude,
        (time * speed * 0.8 + offset).cos() * amplitude,
        (time * speed * 0.5 + offset * 0.5).sin() * amplitude * 0.5,
    )
}

/// Gold mote alpha in [0.3, 1.0].
pub fn gold_twinkle(time: f32, offset: f32) -> f32 {
    0.3 + 0.7 * (0.5 + 0.5 * (time * 2.0 + offset).sin())
}

/// Snow flake position at `time`: falls and wraps within the column.
pub fn snow_fall(base: Vec3, time: f32, offset: f32, config: &AmbientConfig) -> Vec3 {
    let column = config.snow_column_height;
    let mut y = base.y - (time * config.snow_fall_speed + offset * 10.0).rem_euclid(column);
    if y < -column / 2.0 {
        y += column;
    }
    Vec3::new(
        base.x + (time * 0.2 + offset).sin() * config.snow_drift,
        y,
        base.z + (time * 0.15 + offset).cos() * config.snow_drift,
    )
}

/// One ambient layer: static bases plus time-driven current positions.
pub struct AmbientField {
    layer: AmbientLayer,
    config: AmbientConfig,
    bases: Vec<Vec3>,
    scales: Vec<f32>,
    offsets: Vec<f32>,
    current: Vec<Vec3>,
    yaw: f32,
}

impl AmbientField {
    pub fn new(layer: AmbientLayer, config: AmbientConfig, seed: u64) -> Self {
        let (salt, count) = match layer {
            AmbientLayer::Gold => (GOLD_SALT, config.gold_count),
            AmbientLayer::Snow => (SNOW_SALT, config.snow_count),
        };
        let mut rng = subsystem_rng(seed, salt);
        let mut bases = Vec::with_capacity(count);
        let mut scales = Vec::with_capacity(count);
        let mut offsets = Vec::with_capacity(count);

        for _ in 0..count {
            let base = match layer {
                AmbientLayer::Gold => {
                    point_in_shell(&mut rng, config.gold_inner_radius, config.gold_outer_radius)
                }
                AmbientLayer::Snow => {
                    let mut p = point_in_shell(
                        &mut rng,
                        config.snow_inner_radius,
                        config.snow_outer_radius,
                    );
                    p.y = (rng.gen::<f32>() - 0.5) * config.snow_column_height;
                    p
                }
            };
            bases.push(base);
            scales.push(rng.gen());
            offsets.push(rng.gen::<f32>() * 100.0);
        }

        let current = bases.clone();
        Self {
            layer,
            config,
            bases,
            scales,
            offsets,
            current,
            yaw: 0.0,
        }
    }

    pub fn layer(&self) -> AmbientLayer {
        self.layer
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.current)
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Group yaw; only the gold layer turns.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Alpha of particle `i` at `time`.
    pub fn alpha(&self, i: usize, time: f32) -> f32 {
        match self.layer {
            AmbientLayer::Gold => self.offsets.get(i).map_or(0.0, |&o| gold_twinkle(time, o)),
            AmbientLayer::Snow => self.scales.get(i).map_or(0.0, |&s| 0.2 + 0.5 * s),
        }
    }

    /// Recompute positions for the given elapsed time.
    pub fn update(&mut self, elapsed: f32) {
        match self.layer {
            AmbientLayer::Gold => {
                let amp = self.config.gold_drift;
                for ((cur, base), &off) in self.current.iter_mut().zip(&self.bases).zip(&self.offsets) {
                    *cur = gold_drift(*base, elapsed, off, amp);
                }
                self.yaw = (elapsed * self.config.gold_spin) % TAU;
            }
            AmbientLayer::Snow => {
                let config = &self.config;
                for ((cur, base), &off) in self.current.iter_mut().zip(&self.bases).zip(&self.offsets) {
                    *cur = snow_fall(*base, elapsed, off, config);
                }
            }
        }
    }
}
