//! Gesture interaction state machine.
//!
//! Consumes one [`Pose`] per detection tick (plus the landmarks it was
//! classified from) and integrates them into the [`ControlSignals`] the rest
//! of the scene reads every render frame.
//!
//! | Pose | Effect |
//! |---|---|
//! | `PinchOpen3` | NAVIGATION: pinch x drag sets rotation velocity, hand scale drives zoom |
//! | `Pointing` | SELECTION: photo focus on |
//! | `Fist` | tree FORMED, focus off |
//! | `Open` | tree CHAOS, focus off |
//! | `Unknown` / hand lost | IDLE, focus released immediately |

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::landmarks::HandFrame;
use super::pose::{Pose, PoseThresholds};

/// Where the tree is: dispersed or assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TreeState {
    Chaos,
    #[default]
    Formed,
}

impl TreeState {
    /// Progress value every subsystem converges to in this state.
    #[inline]
    pub fn target_progress(&self) -> f32 {
        match self {
            Self::Chaos => 0.0,
            Self::Formed => 1.0,
        }
    }
}

/// Which continuous signal the hand is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Idle,
    Navigation,
    Selection,
}

/// Everything the gesture layer hands to the particle/camera/focus layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlSignals {
    pub tree_state: TreeState,
    /// Normalized zoom in [0, 1]; 0 = far, 1 = near.
    pub zoom_factor: f32,
    /// Rotation velocity published this frame (0 when nothing was published).
    pub rotation_impulse: f32,
    pub photo_focus: bool,
}

impl Default for ControlSignals {
    fn default() -> Self {
        Self {
            tree_state: TreeState::Formed,
            zoom_factor: 0.5,
            rotation_impulse: 0.0,
            photo_focus: false,
        }
    }
}

/// Gesture sensitivity and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum time between detection ticks, in milliseconds.
    pub detection_interval_ms: f64,
    /// Rotation velocity per unit of normalized pinch x movement.
    pub rotation_sensitivity: f32,
    /// Per-render-frame decay of rotation velocity outside NAVIGATION.
    pub inertia_decay: f32,
    /// Velocity magnitude below which inertia snaps to zero.
    pub inertia_epsilon: f32,
    /// Zoom change per unit of hand-scale change.
    pub zoom_sensitivity: f32,
    /// Pinch x movements smaller than this leave the velocity untouched.
    pub drag_dead_band: f32,
    pub initial_zoom: f32,
    pub initial_tree_state: TreeState,
    pub thresholds: PoseThresholds,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            detection_interval_ms: 25.0,
            rotation_sensitivity: 12.0,
            inertia_decay: 0.90,
            inertia_epsilon: 0.001,
            zoom_sensitivity: 6.0,
            drag_dead_band: 0.001,
            initial_zoom: 0.5,
            initial_tree_state: TreeState::Formed,
            thresholds: PoseThresholds::default(),
        }
    }
}

/// Single-writer owner of the process-wide interaction state.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    config: GestureConfig,
    mode: InteractionMode,
    previous_pose: Pose,
    tree_state: TreeState,
    zoom_factor: f32,
    rotation_velocity: f32,
    photo_focus: bool,
    last_centroid: Option<Vec2>,
    last_scale: Option<f32>,
    /// Velocity published since the last render tick.
    pending_impulse: Option<f32>,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureStateMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            mode: InteractionMode::Idle,
            previous_pose: Pose::Unknown,
            tree_state: config.initial_tree_state,
            zoom_factor: config.initial_zoom.clamp(0.0, 1.0),
            rotation_velocity: 0.0,
            photo_focus: false,
            last_centroid: None,
            last_scale: None,
            pending_impulse: None,
            config,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn previous_pose(&self) -> Pose {
        self.previous_pose
    }

    pub fn tree_state(&self) -> TreeState {
        self.tree_state
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    pub fn rotation_velocity(&self) -> f32 {
        self.rotation_velocity
    }

    pub fn photo_focus(&self) -> bool {
        self.photo_focus
    }

    /// Current signals without consuming the pending rotation impulse.
    pub fn signals(&self) -> ControlSignals {
        ControlSignals {
            tree_state: self.tree_state,
            zoom_factor: self.zoom_factor,
            rotation_impulse: self.pending_impulse.unwrap_or(0.0),
            photo_focus: self.photo_focus,
        }
    }

    /// Apply one detection tick.
    pub fn step(&mut self, pose: Pose, frame: &HandFrame) -> ControlSignals {
        let from = self.mode;
        match pose {
            Pose::PinchOpen3 => self.navigate(frame),
            Pose::Pointing => {
                self.mode = InteractionMode::Selection;
                self.photo_focus = true;
                self.clear_anchors();
            }
            Pose::Fist => self.set_tree_state(TreeState::Formed),
            Pose::Open => self.set_tree_state(TreeState::Chaos),
            Pose::Unknown => self.release(),
        }
        self.previous_pose = pose;
        if from != self.mode {
            log::debug!("gesture mode {:?} -> {:?} ({})", from, self.mode, pose.name());
        }
        self.signals()
    }

    /// The tracker returned no hand this tick.
    pub fn hand_lost(&mut self) -> ControlSignals {
        if self.mode != InteractionMode::Idle {
            log::debug!("hand lost in {:?}", self.mode);
        }
        self.photo_focus = false;
        self.mode = InteractionMode::Idle;
        self.clear_anchors();
        self.signals()
    }

    /// Render-frame physics: coast the rotation velocity after a drag and
    /// publish it. Runs every frame whether or not a detection tick ran.
    pub fn tick(&mut self) -> ControlSignals {
        if self.mode != InteractionMode::Navigation {
            self.rotation_velocity *= self.config.inertia_decay;
            if self.rotation_velocity.abs() < self.config.inertia_epsilon {
                self.rotation_velocity = 0.0;
            }
            self.pending_impulse = Some(self.rotation_velocity);
        }
        let signals = self.signals();
        self.pending_impulse = None;
        signals
    }

    fn navigate(&mut self, frame: &HandFrame) {
        self.mode = InteractionMode::Navigation;
        self.photo_focus = false;

        let centroid = frame.pinch_centroid();
        if let Some(last) = self.last_centroid {
            let dx = centroid.x - last.x;
            if dx.abs() > self.config.drag_dead_band {
                // Hand moving right turns the world left.
                self.rotation_velocity = -dx * self.config.rotation_sensitivity;
                self.pending_impulse = Some(self.rotation_velocity);
            }
        }
        self.last_centroid = Some(centroid);

        if let Some(last_scale) = self.last_scale {
            let delta = (frame.scale - last_scale) * self.config.zoom_sensitivity;
            self.zoom_factor = (self.zoom_factor + delta).clamp(0.0, 1.0);
        }
        self.last_scale = Some(frame.scale);
    }

    fn set_tree_state(&mut self, state: TreeState) {
        if self.tree_state != state {
            log::debug!("tree state {:?} -> {:?}", self.tree_state, state);
        }
        self.tree_state = state;
        self.photo_focus = false;
        self.mode = InteractionMode::Idle;
        self.clear_anchors();
    }

    fn release(&mut self) {
        if self.mode == InteractionMode::Selection {
            self.photo_focus = false;
        }
        self.mode = InteractionMode::Idle;
        self.clear_anchors();
    }

    fn clear_anchors(&mut self) {
        self.last_centroid = None;
        self.last_scale = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::{LANDMARK_COUNT, INDEX_TIP, MIDDLE_MCP, THUMB_TIP, WRIST};

    fn pinch_frame(x: f32, scale: f32) -> HandFrame {
        let mut lm = [Vec2::ZERO; LANDMARK_COUNT];
        lm[WRIST] = Vec2::new(x, 0.9);
        lm[MIDDLE_MCP] = Vec2::new(x, 0.9 - scale);
        lm[THUMB_TIP] = Vec2::new(x, 0.5);
        lm[INDEX_TIP] = Vec2::new(x, 0.5);
        HandFrame::new(lm)
    }

    #[test]
    fn test_defaults() {
        let sm = GestureStateMachine::default();
        assert_eq!(sm.mode(), InteractionMode::Idle);
        assert_eq!(sm.tree_state(), TreeState::Formed);
        assert_eq!(sm.zoom_factor(), 0.5);
        assert!(!sm.photo_focus());
    }

    #[test]
    fn test_first_pinch_sets_anchor_only() {
        let mut sm = GestureStateMachine::default();
        let s = sm.step(Pose::PinchOpen3, &pinch_frame(0.5, 0.2));
        assert_eq!(sm.mode(), InteractionMode::Navigation);
        assert_eq!(s.rotation_impulse, 0.0);
        assert_eq!(s.zoom_factor, 0.5);
    }

    #[test]
    fn test_small_drag_inside_dead_band_is_ignored() {
        let mut sm = GestureStateMachine::default();
        sm.step(Pose::PinchOpen3, &pinch_frame(0.5, 0.2));
        let s = sm.step(Pose::PinchOpen3, &pinch_frame(0.5005, 0.2));
        assert_eq!(s.rotation_impulse, 0.0);
        assert_eq!(sm.rotation_velocity(), 0.0);
    }

    #[test]
    fn test_zoom_integrates_scale_change() {
        let mut sm = GestureStateMachine::default();
        sm.step(Pose::PinchOpen3, &pinch_frame(0.5, 0.20));
        let s = sm.step(Pose::PinchOpen3, &pinch_frame(0.5, 0.25));
        assert!((s.zoom_factor - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_velocity_holds_during_navigation() {
        let mut sm = GestureStateMachine::default();
        sm.step(Pose::PinchOpen3, &pinch_frame(0.5, 0.2));
        sm.step(Pose::PinchOpen3, &pinch_frame(0.45, 0.2));
        let v = sm.rotation_velocity();
        let first = sm.tick();
        assert!((first.rotation_impulse - v).abs() < 1e-6);
        let second = sm.tick();
        assert_eq!(second.rotation_impulse, 0.0);
        assert_eq!(sm.rotation_velocity(), v);
    }

    #[test]
    fn test_fist_and_open_toggle_tree_state() {
        let mut sm = GestureStateMachine::default();
        let frame = pinch_frame(0.5, 0.2);
        assert_eq!(sm.step(Pose::Open, &frame).tree_state, TreeState::Chaos);
        assert_eq!(sm.step(Pose::Unknown, &frame).tree_state, TreeState::Chaos);
        assert_eq!(sm.step(Pose::Fist, &frame).tree_state, TreeState::Formed);
    }

    #[test]
    fn test_pointing_then_pinch_releases_focus() {
        let mut sm = GestureStateMachine::default();
        let frame = pinch_frame(0.5, 0.2);
        assert!(sm.step(Pose::Pointing, &frame).photo_focus);
        assert!(!sm.step(Pose::PinchOpen3, &frame).photo_focus);
    }

    #[test]
    fn test_hand_lost_clears_anchors() {
        let mut sm = GestureStateMachine::default();
        sm.step(Pose::PinchOpen3, &pinch_frame(0.5, 0.2));
        sm.hand_lost();
        assert_eq!(sm.mode(), InteractionMode::Idle);
        // Re-entering navigation starts from a fresh anchor.
        let s = sm.step(Pose::PinchOpen3, &pinch_frame(0.1, 0.4));
        assert_eq!(s.rotation_impulse, 0.0);
        assert_eq!(s.zoom_factor, 0.5);
    }
}
