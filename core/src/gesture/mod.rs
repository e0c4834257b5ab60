//! Gesture input: landmarks, pose classification, interaction state.
//!
//! This module provides:
//! - Landmark storage and main-hand selection
//! - Priority-ordered pose classification, normalized by hand scale
//! - The interaction state machine that integrates poses into [`ControlSignals`]
//! - Tracker abstraction with inline or threaded detection pacing

pub mod landmarks;
pub mod pose;
pub mod state_machine;
pub mod tracker;

pub use landmarks::{hand_scale, select_main_hand, HandFrame, RawHand, LANDMARK_COUNT};
pub use pose::{classify, classify_with, FingerStates, Pose, PoseThresholds};
pub use state_machine::{
    ControlSignals, GestureConfig, GestureStateMachine, InteractionMode, TreeState,
};
pub use tracker::{
    Detection, DetectionWorker, GestureController, HandTracker, ScriptedTracker, TrackerError,
    TrackerStatus,
};
