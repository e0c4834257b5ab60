//! Camera rig: zoom distance plus a slow lateral float.
//!
//! The rig is the only writer of camera position and orientation. Distance
//! follows the zoom factor at a faster rate than the lateral float so zoom
//! feels responsive while the drift stays lazy.

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::particles::{lerp, smoothing_factor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub start_position: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub far_distance: f32,
    pub near_distance: f32,
    pub look_at: [f32; 3],
    pub distance_rate: f32,
    pub lateral_rate: f32,
    pub float_x_amplitude: f32,
    pub float_x_frequency: f32,
    pub float_y_base: f32,
    pub float_y_amplitude: f32,
    pub float_y_frequency: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 8.0, 50.0],
            fov_degrees: 45.0,
            far_distance: 120.0,
            near_distance: 40.0,
            look_at: [0.0, 10.0, 0.0],
            distance_rate: 1.5,
            lateral_rate: 0.5,
            float_x_amplitude: 4.0,
            float_x_frequency: 0.15,
            float_y_base: 10.0,
            float_y_amplitude: 3.0,
            float_y_frequency: 0.1,
        }
    }
}

/// Orientation whose -Z axis points from `eye` toward `target`, with +Y up.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Quat {
    let forward = (target - eye).normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = forward.cross(Vec3::Y);
    if right.length_squared() < 1e-12 {
        // Looking straight up or down.
        right = Vec3::X;
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraConfig,
    position: Vec3,
    orientation: Quat,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        let position = Vec3::from_array(config.start_position);
        let orientation = look_rotation(position, Vec3::from_array(config.look_at));
        Self {
            config,
            position,
            orientation,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn fov_radians(&self) -> f32 {
        self.config.fov_degrees.to_radians()
    }

    pub fn look_at(&self) -> Vec3 {
        Vec3::from_array(self.config.look_at)
    }

    /// Distance the rig is heading for at this zoom factor.
    pub fn target_distance(&self, zoom: f32) -> f32 {
        lerp(
            self.config.far_distance,
            self.config.near_distance,
            zoom.clamp(0.0, 1.0),
        )
    }

    /// Lateral float target at `elapsed` seconds.
    pub fn float_target(&self, elapsed: f32) -> (f32, f32) {
        let c = &self.config;
        (
            (elapsed * c.float_x_frequency).sin() * c.float_x_amplitude,
            c.float_y_base + (elapsed * c.float_y_frequency).cos() * c.float_y_amplitude,
        )
    }

    /// Advance one frame and re-aim at the look-at point.
    pub fn update(&mut self, delta: f32, elapsed: f32, zoom: f32) {
        let (fx, fy) = self.float_target(elapsed);
        let lateral = smoothing_factor(self.config.lateral_rate, delta);
        let depth = smoothing_factor(self.config.distance_rate, delta);

        self.position.x = lerp(self.position.x, fx, lateral);
        self.position.y = lerp(self.position.y, fy, lateral);
        self.position.z = lerp(self.position.z, self.target_distance(zoom), depth);
        self.orientation = look_rotation(self.position, self.look_at());
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at(), Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), aspect, 0.1, 1000.0)
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
