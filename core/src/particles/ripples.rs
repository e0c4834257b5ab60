//! Ground ripples: a flat disc of points under the tree.
//!
//! The points never move on the CPU. Progress drives the reveal radius and
//! global opacity, and the wave height is evaluated by the point shader; the
//! functions here are the reference the shader is written against.

use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampling::{point_in_disc, subsystem_rng};
use super::{smoothstep, FrameInput, ParticleSubsystem, Progress};
use crate::gesture::TreeState;

const SALT: u64 = 0x7269_7070;

const DEEP_COLOR: [f32; 3] = [0.267, 0.267, 0.267];
const HIGH_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RippleConfig {
    pub count: usize,
    pub radius: f32,
    pub group_y: f32,
    /// Tilt of the disc about x, in degrees.
    pub tilt_degrees: f32,
    /// Spin in radians per second (negative turns clockwise seen from above).
    pub spin_speed: f32,
    pub rate: f32,
    /// Reveal radius at full opacity.
    pub reveal_radius: f32,
    /// Width of the soft edge at the reveal front.
    pub reveal_edge: f32,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            count: 360_000,
            radius: 116.0,
            group_y: -11.0,
            tilt_degrees: 20.0,
            spin_speed: -0.012,
            rate: 2.5,
            reveal_radius: 150.0,
            reveal_edge: 40.0,
        }
    }
}

/// Wave height at a disc-local position.
pub fn ripple_height(pos: Vec3, time: f32) -> f32 {
    let r = (pos.x * pos.x + pos.z * pos.z).sqrt();
    let angle = pos.z.atan2(pos.x);

    let distortion = (angle * 3.0 + time * 0.2).sin() * 5.6
        + (angle * 7.0 - time * 0.1).cos() * 3.0
        + (angle * 12.0).sin() * 1.2;
    let distorted_r = r + distortion * smoothstep(10.0, 90.0, r);

    let wave = (distorted_r * 0.7 - angle * 5.0 + time * 0.45).sin();
    let noise = (r * 0.35 + time * 0.25).sin() * (angle * 4.0).sin();
    wave + noise * 0.25
}

/// Vertical displacement applied to a point of the given height.
pub fn ripple_displacement(height: f32) -> f32 {
    height * 1.6
}

/// Per-point alpha before the global opacity multiply: a reveal front
/// growing with opacity, an outer edge fade and a hole at the centre.
pub fn ripple_alpha(r: f32, opacity: f32, reveal_radius: f32, reveal_edge: f32) -> f32 {
    let limit = opacity * reveal_radius;
    let radial = smoothstep(limit, limit - reveal_edge, r);
    let edge = 1.0 - smoothstep(84.0, 116.0, r);
    let centre = smoothstep(6.0, 20.0, r);
    edge * centre * radial
}

/// Crest/trough colour mix.
pub fn ripple_color(height: f32) -> [f32; 3] {
    let t = smoothstep(-1.0, -0.4, height);
    [0, 1, 2].map(|k| DEEP_COLOR[k] + (HIGH_COLOR[k] - DEEP_COLOR[k]) * t)
}

/// Point size: crests draw larger, attenuated by depth.
pub fn ripple_point_size(height: f32, random: f32, depth: f32) -> f32 {
    let size_factor = smoothstep(-1.0, -0.4, height);
    let base = (25.0 + random * 15.0) * (0.6 + size_factor * 0.6);
    crate::render::point_size(base * 15.0, depth)
}

pub struct GroundRipples {
    config: RippleConfig,
    positions: Vec<Vec3>,
    randoms: Vec<f32>,
    opacity: Progress,
    spin: f32,
}

impl GroundRipples {
    pub fn new(config: RippleConfig, seed: u64) -> Self {
        let mut rng = subsystem_rng(seed, SALT);
        let mut positions = Vec::with_capacity(config.count);
        let mut randoms = Vec::with_capacity(config.count);
        for _ in 0..config.count {
            positions.push(point_in_disc(&mut rng, config.radius));
            randoms.push(rng.gen());
        }

        Self {
            opacity: Progress::new(config.rate),
            config,
            positions,
            randoms,
            spin: 0.0,
        }
    }

    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn randoms(&self) -> &[f32] {
        &self.randoms
    }

    /// Global opacity uniform; also sets how far the reveal has spread.
    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }

    /// Current reveal radius.
    pub fn reveal_radius(&self) -> f32 {
        self.opacity.value() * self.config.reveal_radius
    }

    /// Alpha of point `i` at the current opacity.
    pub fn point_alpha(&self, i: usize) -> f32 {
        self.positions.get(i).map_or(0.0, |p| {
            let r = (p.x * p.x + p.z * p.z).sqrt();
            ripple_alpha(
                r,
                self.opacity.value(),
                self.config.reveal_radius,
                self.config.reveal_edge,
            ) * self.opacity.value()
        })
    }

    /// Model matrix: lowered, tilted group with the slow disc spin inside.
    pub fn group_transform(&self) -> Mat4 {
        let group = Mat4::from_rotation_translation(
            Quat::from_rotation_x(self.config.tilt_degrees.to_radians()),
            Vec3::Y * self.config.group_y,
        );
        group * Mat4::from_quat(Quat::from_rotation_y(self.spin))
    }
}

impl ParticleSubsystem for GroundRipples {
    fn name(&self) -> &'static str {
        "ripples"
    }

    fn update(&mut self, frame: &FrameInput, tree_state: TreeState) {
        self.opacity.follow(tree_state, frame.delta);
        self.spin = frame.elapsed * self.config.spin_speed;
    }

    fn progress(&self) -> f32 {
        self.opacity.value()
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_hides_everything_at_zero_opacity() {
        for r in [0.0, 10.0, 50.0, 110.0] {
            assert_eq!(ripple_alpha(r, 0.0, 150.0, 40.0), 0.0);
        }
    }

    #[test]
    fn test_full_reveal_shapes_ring() {
        // Hole in the centre, full in the band, faded at the rim.
        assert_eq!(ripple_alpha(3.0, 1.0, 150.0, 40.0), 0.0);
        assert!((ripple_alpha(50.0, 1.0, 150.0, 40.0) - 1.0).abs() < 1e-6);
        assert_eq!(ripple_alpha(116.0, 1.0, 150.0, 40.0), 0.0);
    }

    #[test]
    fn test_height_is_bounded() {
        for k in 0..200 {
            let a = k as f32 * 0.37;
            let pos = Vec3::new(a.cos() * k as f32 * 0.5, 0.0, a.sin() * k as f32 * 0.5);
            assert!(ripple_height(pos, k as f32 * 0.1).abs() <= 1.25 + 1e-4);
        }
    }

    #[test]
    fn test_points_are_static_and_spin_follows_time() {
        let mut ripples = GroundRipples::new(
            RippleConfig {
                count: 100,
                ..Default::default()
            },
            3,
        );
        let before = ripples.positions().to_vec();
        ripples.update(&FrameInput::new(0.2, 10.0), TreeState::Formed);
        assert_eq!(ripples.positions(), &before[..]);
        assert!(ripples.opacity() > 0.0 && ripples.opacity() < 1.0);
        let expected = Quat::from_rotation_y(-0.12);
        let m = ripples.group_transform();
        let (_, rot, trans) = m.to_scale_rotation_translation();
        assert!((trans.y + 11.0).abs() < 1e-5);
        let tilt = Quat::from_rotation_x(20f32.to_radians());
        assert!(rot.angle_between(tilt * expected) < 1e-3);
    }

    #[test]
    fn test_crest_color_is_brighter() {
        assert!(ripple_color(1.0)[0] > ripple_color(-1.0)[0]);
    }
}
