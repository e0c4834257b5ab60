//! Photo focus: lifts one photo ornament in front of the camera.
//!
//! A photo is picked only on the rising edge of the focus signal, by
//! squared distance to the camera. While focus stays asserted the pick is
//! stable; a release and re-assert picks again. The lifted transform keeps a
//! constant apparent size whatever the camera zoom.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{OrnamentSet, Placement};
use crate::particles::Progress;
use crate::render::InstanceRaw;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Distance in front of the camera.
    pub distance: f32,
    /// Fraction of the view height the photo frame fills.
    pub height_fraction: f32,
    /// Height of the photo frame mesh at unit scale.
    pub frame_height: f32,
    pub rate: f32,
    /// At or below this focus progress the lifted photo is hidden.
    pub hide_threshold: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            height_fraction: 0.612,
            frame_height: 1.6,
            rate: 5.0,
            hide_threshold: 0.001,
        }
    }
}

/// Camera and tree-group state the focus layer needs each frame.
///
/// The tree group maps its local frame to the world as
/// `offset + scale * (yaw rotation * p)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusView {
    pub camera_position: Vec3,
    pub camera_orientation: Quat,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub group_yaw: f32,
    pub group_scale: f32,
    pub group_offset: Vec3,
}

impl FocusView {
    fn group_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.group_yaw)
    }

    /// Model matrix of the tree group.
    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.group_scale),
            self.group_rotation(),
            self.group_offset,
        )
    }

    /// Tree-group point in world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.group_offset + self.group_rotation() * local * self.group_scale
    }

    /// World point in the tree group's frame.
    pub fn to_group(&self, world: Vec3) -> Vec3 {
        self.group_rotation().inverse() * ((world - self.group_offset) / self.group_scale)
    }
}

#[derive(Debug, Clone)]
pub struct FocusController {
    config: FocusConfig,
    active: Option<usize>,
    previous: bool,
    progress: Progress,
}

impl FocusController {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            progress: Progress::new(config.rate),
            config,
            active: None,
            previous: false,
        }
    }

    /// Index of the focused ornament, if one has been picked.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn focus_progress(&self) -> f32 {
        self.progress.value()
    }

    /// Whether the lifted photo is currently drawn.
    pub fn is_showing(&self) -> bool {
        self.active.is_some() && self.progress.value() > self.config.hide_threshold
    }

    /// Drop the current pick, e.g. when the ornament set is rebuilt.
    pub fn clear(&mut self) {
        self.active = None;
        self.progress = Progress::new(self.config.rate);
    }

    /// Feed this frame's focus flag. Picks the photo nearest the camera on a
    /// rising edge; otherwise leaves the pick alone.
    pub fn observe(&mut self, photo_focus: bool, ornaments: &OrnamentSet, view: &FocusView) -> Option<usize> {
        if photo_focus && !self.previous {
            if let Some(index) = nearest_photo(ornaments, view) {
                log::debug!("Focus picked ornament {index}");
                self.active = Some(index);
            }
        }
        self.previous = photo_focus;
        self.active
    }

    /// Smooth focus progress toward the flag.
    pub fn advance(&mut self, photo_focus: bool, delta: f32) -> f32 {
        self.progress
            .advance(if photo_focus { 1.0 } else { 0.0 }, delta)
    }

    /// Transform, in the tree group's frame, that puts a photo squarely in
    /// front of the camera at constant apparent size.
    pub fn target_placement(&self, view: &FocusView) -> Placement {
        let c = &self.config;
        let height = 2.0 * (view.fov / 2.0).tan() * c.distance * c.height_fraction;
        let scale = height / c.frame_height;

        let forward = view.camera_orientation * Vec3::NEG_Z;
        let world = view.camera_position + forward * c.distance;
        let group_inv = view.group_rotation().inverse();

        Placement {
            position: view.to_group(world),
            rotation: (group_inv * view.camera_orientation).normalize(),
            // The group scale is applied on top of this one.
            scale: Vec3::splat(scale / view.group_scale),
        }
    }

    /// Blended transform of the lifted photo, or `None` while hidden.
    pub fn focused_placement(
        &self,
        ornaments: &OrnamentSet,
        view: &FocusView,
        time: f32,
    ) -> Option<Placement> {
        if !self.is_showing() {
            return None;
        }
        let index = self.active?;
        let orn = ornaments.get(index)?;
        let tree = ornaments.placement(index, time)?;
        let fp = self.progress.value();
        let target = self.target_placement(view);

        let start_rotation = Quat::from_rotation_y(time * 0.2 + orn.phase)
            * Quat::from_rotation_z((time * 0.5 + orn.phase).sin() * 0.1);

        Some(Placement {
            position: tree.position.lerp(target.position, fp),
            rotation: start_rotation.slerp(target.rotation, fp),
            scale: tree.scale.lerp(target.scale, fp),
        })
    }

    /// Instance for the lifted photo; zero scale while hidden.
    pub fn focused_instance(&self, ornaments: &OrnamentSet, view: &FocusView, time: f32) -> InstanceRaw {
        self.focused_placement(ornaments, view, time)
            .map_or_else(InstanceRaw::hidden, |p| InstanceRaw::new(p.matrix(), [1.0; 4]))
    }

    /// Texture of the focused photo, for binding its material.
    pub fn focused_texture(&self, ornaments: &OrnamentSet) -> Option<usize> {
        match ornaments.get(self.active?)?.kind {
            super::OrnamentKind::UserPhoto { texture_index } => Some(texture_index),
            _ => None,
        }
    }
}

impl Default for FocusController {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

/// Photo ornament whose progress-interpolated position, turned by the group
/// yaw, is closest to the camera.
pub fn nearest_photo(ornaments: &OrnamentSet, view: &FocusView) -> Option<usize> {
    let p = ornaments.progress();
    ornaments
        .photo_indices()
        .map(|i| {
            let world = view.to_world(ornaments.ornaments()[i].base_position(p));
            (i, world.distance_squared(view.camera_position))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
