//! Hand landmark storage and main-hand selection.
//!
//! Landmarks arrive from the external hand-tracking model as 21 normalized
//! 2D points per hand. [`HandFrame`] bundles them with a derived `scale`
//! (wrist to middle-finger knuckle) that every distance threshold is
//! normalized against.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// Landmark indices
// ============================================================================

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// (tip, pip) pairs for the four non-thumb fingers, index to pinky.
pub const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

// ============================================================================
// Data structures
// ============================================================================

/// Raw landmark set for one hand as returned by the tracker.
pub type RawHand = [Vec2; LANDMARK_COUNT];

/// One detection tick's worth of landmarks for the main hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub landmarks: RawHand,
    /// Wrist to middle MCP distance.
    pub scale: f32,
}

impl HandFrame {
    /// Build a frame, deriving `scale` from the landmarks.
    pub fn new(landmarks: RawHand) -> Self {
        let scale = hand_scale(&landmarks);
        Self { landmarks, scale }
    }

    /// Build a frame with an externally supplied scale.
    pub fn with_scale(landmarks: RawHand, scale: f32) -> Self {
        Self { landmarks, scale }
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vec2 {
        self.landmarks[index]
    }

    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        self.landmarks[a].distance(self.landmarks[b])
    }

    /// Midpoint of the thumb and index fingertips.
    pub fn pinch_centroid(&self) -> Vec2 {
        (self.landmarks[THUMB_TIP] + self.landmarks[INDEX_TIP]) * 0.5
    }

    /// Uniformly scale every coordinate (and the scale) by `k`.
    pub fn scaled(&self, k: f32) -> Self {
        let mut landmarks = self.landmarks;
        for p in landmarks.iter_mut() {
            *p *= k;
        }
        Self {
            landmarks,
            scale: self.scale * k,
        }
    }
}

/// Hand size proxy used for normalization and main-hand selection.
pub fn hand_scale(landmarks: &RawHand) -> f32 {
    landmarks[WRIST].distance(landmarks[MIDDLE_MCP])
}

/// Pick the closest/largest hand out of everything the tracker returned.
///
/// Returns `None` when no hand is present, which the caller treats as
/// "hand lost".
pub fn select_main_hand(hands: &[RawHand]) -> Option<HandFrame> {
    let mut best: Option<HandFrame> = None;
    for hand in hands {
        let frame = HandFrame::new(*hand);
        if frame.scale > best.map_or(0.0, |b| b.scale) {
            best = Some(frame);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with_knuckle(y: f32) -> RawHand {
        let mut hand = [Vec2::ZERO; LANDMARK_COUNT];
        hand[WRIST] = Vec2::new(0.5, 0.9);
        hand[MIDDLE_MCP] = Vec2::new(0.5, 0.9 - y);
        hand
    }

    #[test]
    fn test_scale_is_wrist_to_middle_knuckle() {
        let frame = HandFrame::new(hand_with_knuckle(0.2));
        assert!((frame.scale - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_select_main_hand_prefers_largest() {
        let small = hand_with_knuckle(0.1);
        let large = hand_with_knuckle(0.3);
        let picked = select_main_hand(&[small, large, small]).unwrap();
        assert!((picked.scale - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_select_main_hand_empty_is_none() {
        assert!(select_main_hand(&[]).is_none());
    }

    #[test]
    fn test_pinch_centroid() {
        let mut hand = [Vec2::ZERO; LANDMARK_COUNT];
        hand[THUMB_TIP] = Vec2::new(0.2, 0.4);
        hand[INDEX_TIP] = Vec2::new(0.4, 0.6);
        let frame = HandFrame::new(hand);
        assert!((frame.pinch_centroid() - Vec2::new(0.3, 0.5)).length() < 1e-6);
    }
}
