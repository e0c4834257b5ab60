//! Hand-shape classification.
//!
//! A small fixed set of heuristics tuned for a webcam framing one hand.
//! The heuristics overlap under the lenient thresholds, so they are
//! evaluated in a fixed priority order and the first match wins.

use serde::{Deserialize, Serialize};

use super::landmarks::{HandFrame, FINGER_JOINTS, INDEX_TIP, THUMB_TIP, WRIST};

/// Classified hand shape for one detection tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pose {
    /// Thumb-index pinch with middle, ring and pinky extended.
    PinchOpen3,
    /// Index extended, the other three curled.
    Pointing,
    /// All four non-thumb fingers curled.
    Fist,
    /// All four non-thumb fingers extended.
    Open,
    #[default]
    Unknown,
}

impl Pose {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PinchOpen3 => "pinch-open3",
            Self::Pointing => "pointing",
            Self::Fist => "fist",
            Self::Open => "open",
            Self::Unknown => "unknown",
        }
    }

    /// Priority order used by [`classify`].
    pub fn all() -> &'static [Self] {
        &[
            Self::PinchOpen3,
            Self::Pointing,
            Self::Fist,
            Self::Open,
            Self::Unknown,
        ]
    }
}

/// Thresholds for the finger and pinch heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseThresholds {
    /// Pinch distance / hand scale below which thumb and index count as pinched.
    pub pinch_ratio: f32,
    /// A finger is extended when tip-to-wrist >= pip-to-wrist * this.
    pub extend_margin: f32,
    /// A finger is curled when tip-to-wrist < pip-to-wrist * this.
    pub curl_margin: f32,
}

impl Default for PoseThresholds {
    fn default() -> Self {
        Self {
            pinch_ratio: 0.35,
            extend_margin: 1.0,
            curl_margin: 1.25,
        }
    }
}

/// Per-finger extension/curl flags, index to pinky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerStates {
    pub extended: [bool; 4],
    pub curled: [bool; 4],
}

impl FingerStates {
    pub fn measure(frame: &HandFrame, thresholds: &PoseThresholds) -> Self {
        let mut extended = [false; 4];
        let mut curled = [false; 4];
        for (i, &(tip, pip)) in FINGER_JOINTS.iter().enumerate() {
            let d_tip = frame.distance(tip, WRIST);
            let d_pip = frame.distance(pip, WRIST);
            extended[i] = d_tip >= d_pip * thresholds.extend_margin;
            curled[i] = d_tip < d_pip * thresholds.curl_margin;
        }
        Self { extended, curled }
    }
}

/// Classify a hand frame with the default thresholds.
pub fn classify(frame: &HandFrame) -> Pose {
    classify_with(frame, &PoseThresholds::default())
}

/// Classify a hand frame.
///
/// Finger tests compare distances measured from the same hand, and the pinch
/// test divides by `frame.scale`, so the result does not depend on hand size
/// or distance from the camera.
pub fn classify_with(frame: &HandFrame, thresholds: &PoseThresholds) -> Pose {
    let FingerStates { extended, curled } = FingerStates::measure(frame, thresholds);
    let [index_out, mid_out, ring_out, pinky_out] = extended;
    let [index_curled, mid_curled, ring_curled, pinky_curled] = curled;

    let pinched = frame.scale > 0.0
        && frame.distance(THUMB_TIP, INDEX_TIP) / frame.scale < thresholds.pinch_ratio;
    if pinched && mid_out && ring_out && pinky_out {
        return Pose::PinchOpen3;
    }

    if index_out && mid_curled && ring_curled && pinky_curled {
        return Pose::Pointing;
    }

    if index_curled && mid_curled && ring_curled && pinky_curled {
        return Pose::Fist;
    }

    if index_out && mid_out && ring_out && pinky_out {
        return Pose::Open;
    }

    Pose::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::*;
    use glam::Vec2;

    /// Vertical hand: wrist at the bottom, fingers pointing up.
    fn hand(extended: [bool; 4], pinch: bool) -> HandFrame {
        let mut lm = [Vec2::ZERO; LANDMARK_COUNT];
        lm[WRIST] = Vec2::new(0.5, 0.9);
        let xs = [0.44, 0.49, 0.54, 0.59];
        let mcps = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
        for (i, &(tip, pip)) in FINGER_JOINTS.iter().enumerate() {
            lm[mcps[i]] = Vec2::new(xs[i], 0.7);
            lm[pip] = Vec2::new(xs[i], 0.6);
            lm[tip] = if extended[i] {
                Vec2::new(xs[i], 0.45)
            } else {
                Vec2::new(xs[i], 0.72)
            };
        }
        lm[THUMB_TIP] = if pinch {
            lm[INDEX_TIP] + Vec2::new(-0.01, 0.0)
        } else {
            Vec2::new(0.3, 0.7)
        };
        HandFrame::new(lm)
    }

    #[test]
    fn test_open_hand() {
        assert_eq!(classify(&hand([true; 4], false)), Pose::Open);
    }

    #[test]
    fn test_fist() {
        assert_eq!(classify(&hand([false; 4], false)), Pose::Fist);
    }

    #[test]
    fn test_pointing() {
        assert_eq!(classify(&hand([true, false, false, false], false)), Pose::Pointing);
    }

    #[test]
    fn test_pinch_wins_over_open() {
        assert_eq!(classify(&hand([true; 4], true)), Pose::PinchOpen3);
    }

    #[test]
    fn test_mixed_is_unknown() {
        assert_eq!(classify(&hand([true, true, false, false], false)), Pose::Unknown);
    }

    #[test]
    fn test_zero_scale_never_pinches() {
        let frame = HandFrame::with_scale(hand([true; 4], true).landmarks, 0.0);
        assert_eq!(classify(&frame), Pose::Open);
    }
}
