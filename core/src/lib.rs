//! Holiday Tree Core
//!
//! Gesture-driven particle choreography for an interactive 3D holiday tree.
//!
//! # Features
//!
//! - Hand-pose classification from 21 tracked landmarks
//! - Gesture state machine emitting tree state, zoom, rotation and photo focus
//! - Chaos-to-formed transitions for needles, dust, spirals and ground ripples
//! - Instanced ornaments with a camera-facing photo focus
//! - Camera rig with zoom and idle float
//! - Threaded detection with a latest-wins handoff
//! - Gift link storage for shared photo lists

pub mod camera;
pub mod config;
pub mod gesture;
pub mod gift;
pub mod ornaments;
pub mod particles;
pub mod render;
pub mod rotation;
pub mod scene;
pub mod textures;

// Re-export commonly used types
pub use camera::{CameraConfig, CameraRig};
pub use config::{ConfigError, SceneConfig};
pub use gesture::{
    classify, ControlSignals, DetectionWorker, GestureConfig, GestureController,
    GestureStateMachine, HandFrame, HandTracker, InteractionMode, Pose, ScriptedTracker,
    TrackerError, TrackerStatus, TreeState,
};
pub use gift::{FilePhotoStore, GiftError, GiftRecord, InMemoryPhotoStore, PhotoStore};
pub use ornaments::{FocusController, Ornament, OrnamentKind, OrnamentSet};
pub use particles::{FrameInput, ParticleSubsystem, Progress};
pub use render::{FrameUniforms, InstanceRaw, PointVertex};
pub use rotation::TreeRotation;
pub use scene::Scene;
