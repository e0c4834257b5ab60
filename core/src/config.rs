//! Scene-wide configuration.
//!
//! Every subsystem keeps its own tuned defaults; [`SceneConfig`] gathers them
//! with the sampling seed so a host can embed or override them in one place.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraConfig;
use crate::gesture::GestureConfig;
use crate::ornaments::{FocusConfig, OrnamentConfig};
use crate::particles::{AmbientConfig, DustConfig, NeedleConfig, RippleConfig, SpiralConfig};
use crate::rotation::RotationConfig;

/// Errors from [`SceneConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    InvalidCount { field: &'static str },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Placement of the tree group (needles, dust, spirals, ornaments) in the
/// world. The camera framing is tuned for the default doubled tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeGroupConfig {
    pub scale: f32,
    pub offset: [f32; 3],
}

impl Default for TreeGroupConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            offset: [0.0, -5.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Seed for every deterministic sampler.
    pub seed: u64,
    pub gesture: GestureConfig,
    pub needles: NeedleConfig,
    pub dust: DustConfig,
    pub spirals: SpiralConfig,
    pub ripples: RippleConfig,
    pub ambient: AmbientConfig,
    pub ornaments: OrnamentConfig,
    pub focus: FocusConfig,
    pub camera: CameraConfig,
    pub rotation: RotationConfig,
    pub tree_group: TreeGroupConfig,
}

fn count(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidCount { field })
    } else {
        Ok(())
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

impl SceneConfig {
    /// A much smaller scene with the same behaviour, for tests and benches.
    pub fn lightweight() -> Self {
        let mut config = Self::default();
        config.needles.count = 4000;
        config.dust.count = 400;
        config.spirals.beads_per_strand = 300;
        config.ripples.count = 3000;
        config.ambient.gold_count = 200;
        config.ambient.snow_count = 1000;
        config
    }

    /// Reject zero particle counts, fractions outside [0, 1] and
    /// non-positive rates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        count("needles.count", self.needles.count)?;
        count("needles.tree_tiers", self.needles.tree_tiers as usize)?;
        count("dust.count", self.dust.count)?;
        count("spirals.strands", self.spirals.strands)?;
        count("spirals.beads_per_strand", self.spirals.beads_per_strand)?;
        count("ripples.count", self.ripples.count)?;
        count("ambient.gold_count", self.ambient.gold_count)?;
        count("ambient.snow_count", self.ambient.snow_count)?;
        count("ornaments.count", self.ornaments.count)?;
        count("ornaments.tree_tiers", self.ornaments.tree_tiers as usize)?;

        unit("gesture.inertia_decay", self.gesture.inertia_decay)?;
        unit("gesture.initial_zoom", self.gesture.initial_zoom)?;
        unit("dust.friction", self.dust.friction)?;
        unit("rotation.damping", self.rotation.damping)?;
        unit("ornaments.always_visible_fraction", self.ornaments.always_visible_fraction)?;
        unit("ornaments.photo_threshold", self.ornaments.photo_threshold)?;
        unit("ornaments.heptagram_threshold", self.ornaments.heptagram_threshold)?;
        unit("ornaments.sphere_threshold", self.ornaments.sphere_threshold)?;
        unit("ornaments.box_threshold", self.ornaments.box_threshold)?;

        positive("needles.rate", self.needles.rate)?;
        positive("dust.rate", self.dust.rate)?;
        positive("spirals.rate", self.spirals.rate)?;
        positive("spirals.opacity_rate", self.spirals.opacity_rate)?;
        positive("ripples.rate", self.ripples.rate)?;
        positive("ornaments.rate", self.ornaments.rate)?;
        positive("focus.rate", self.focus.rate)?;
        positive("focus.distance", self.focus.distance)?;
        positive("camera.distance_rate", self.camera.distance_rate)?;
        positive("camera.lateral_rate", self.camera.lateral_rate)?;
        positive("tree_group.scale", self.tree_group.scale)?;
        positive("gesture.detection_interval_ms", self.gesture.detection_interval_ms as f32)?;

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::OutOfRange {
                field: "camera.fov_degrees",
                value: self.camera.fov_degrees,
            });
        }
        Ok(())
    }
}
