//! Renderer-facing data.
//!
//! This module provides:
//! - Plain-old-data vertex, instance and uniform layouts
//! - The point-sprite behaviours every particle shader shares (depth size
//!   attenuation, additive glow falloff, circular discard)
//!
//! Drawing itself belongs to the host renderer.

use glam::Mat4;

/// One point-sprite vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    /// Per-point random used for culling and sparkle.
    pub random: f32,
    pub color: [f32; 4],
}

/// Per-instance transform and colour for instanced meshes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    /// Zero-scale instance: draws nothing.
    pub fn hidden() -> Self {
        Self::new(Mat4::ZERO, [0.0; 4])
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn is_hidden(&self) -> bool {
        self.matrix().x_axis.length_squared() == 0.0
    }
}

impl Default for InstanceRaw {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Scalar shader uniforms shared by all particle materials.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub time: f32,
    /// Needle/ornament progress.
    pub progress: f32,
    pub zoom: f32,
    /// Spiral ribbon opacity.
    pub spiral_opacity: f32,
    /// Ground ripple opacity.
    pub ripple_opacity: f32,
    pub focus_progress: f32,
    pub tree_yaw: f32,
    pub _padding: f32,
}

/// Size-attenuated point size: `scale / depth`, where depth is the distance
/// in front of the camera. Points at or behind the camera get size zero.
#[inline]
pub fn point_size(scale: f32, depth: f32) -> f32 {
    if depth <= f32::EPSILON {
        0.0
    } else {
        scale / depth
    }
}

/// Glow alpha at sprite coordinate `coord` (each axis in [0, 1]).
///
/// Returns `None` outside the inscribed circle (the fragment is discarded),
/// otherwise `(1 - 2d)^exponent` for distance `d` from the centre.
pub fn glow_alpha(coord: [f32; 2], exponent: f32) -> Option<f32> {
    let dx = coord[0] - 0.5;
    let dy = coord[1] - 0.5;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > 0.5 {
        return None;
    }
    Some((1.0 - dist * 2.0).powf(exponent))
}
