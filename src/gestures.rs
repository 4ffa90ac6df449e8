//! Stateless gesture classifiers.
//!
//! Each predicate maps the current frame's features (and, for blinks and the
//! air-drawn V, an already-smoothed signal or a trajectory) to a yes/no
//! answer. Timing and rate limiting live in [`crate::debounce`].

use crate::{
    config::{AirVConfig, FaceConfig, HandConfig},
    features::HandFeatures,
    smoothing::Trajectory,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every gesture the classifiers can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    ThumbsDown,
    OpenPalm,
    ClosedFist,
    VSign,
    AirV,
    Blink,
    Tap,
    Pinch,
    ScrollEngage,
}

impl GestureKind {
    /// Order in which same-frame edge events are acted on; thumbs-down is
    /// terminal and must win
    pub const PRIORITY: [Self; 7] = [
        Self::ThumbsDown,
        Self::OpenPalm,
        Self::ClosedFist,
        Self::VSign,
        Self::AirV,
        Self::Blink,
        Self::Tap,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ThumbsDown => "thumbs_down",
            Self::OpenPalm => "open_palm",
            Self::ClosedFist => "closed_fist",
            Self::VSign => "v_sign",
            Self::AirV => "air_v",
            Self::Blink => "blink",
            Self::Tap => "tap",
            Self::Pinch => "pinch",
            Self::ScrollEngage => "scroll_engage",
        }
    }

    /// Priority rank, lower acts first
    #[must_use]
    pub fn rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quick index-thumb touch
#[must_use]
pub fn is_tap(hand: &HandFeatures, config: &HandConfig) -> bool {
    hand.index_thumb_distance < config.tap_distance
}

/// Index and thumb pinched together closely enough to start a drag
#[must_use]
pub fn is_pinch(hand: &HandFeatures, config: &HandConfig) -> bool {
    hand.index_thumb_distance < config.pinch_distance
}

/// Whether an active drag should keep holding the button
#[must_use]
pub fn holds_pinch(hand: &HandFeatures, config: &HandConfig) -> bool {
    hand.index_thumb_distance < config.drag_release_distance
}

/// Index and middle held together; suppressed while dragging
#[must_use]
pub fn is_scroll_engage(hand: &HandFeatures, config: &HandConfig, drag_active: bool) -> bool {
    !drag_active && hand.index_middle_distance < config.scroll_distance
}

/// All four non-thumb fingers closed
#[must_use]
pub fn is_closed_fist(hand: &HandFeatures) -> bool {
    hand.fingers.non_thumb().iter().all(|open| !open)
}

/// All four non-thumb fingers open
#[must_use]
pub fn is_open_palm(hand: &HandFeatures) -> bool {
    hand.fingers.non_thumb().iter().all(|open| *open)
}

/// Index and middle open, ring and pinky closed
#[must_use]
pub fn is_v_sign(hand: &HandFeatures) -> bool {
    matches!(hand.fingers.non_thumb(), [true, true, false, false])
}

/// Thumb tip below both its own lower joint and the index base joint
#[must_use]
pub fn is_thumbs_down(hand: &HandFeatures) -> bool {
    hand.thumb_drop > 0.0
}

/// Smoothed eye-aspect-ratio under the closed-eye threshold
#[must_use]
pub fn eyes_closed(smoothed_ear: f64, config: &FaceConfig) -> bool {
    smoothed_ear < config.ear_threshold
}

/// A V drawn in the air: the buffered fingertip path, split at its
/// midpoint, moves down-left and then down-right by more than the margins
#[must_use]
pub fn is_air_v(trajectory: &Trajectory, config: &AirVConfig) -> bool {
    if trajectory.len() < config.min_points {
        return false;
    }

    let Some(((dx1, dy1), (dx2, dy2))) = trajectory.half_displacements() else {
        return false;
    };

    dy1 > config.vertical_margin_px
        && dx1 < -config.horizontal_margin_px
        && dy2 > config.vertical_margin_px
        && dx2 > config.horizontal_margin_px
}

/// Edge-candidate hand gestures present in this frame, in priority order
#[must_use]
pub fn classify_hand(hand: &HandFeatures, config: &HandConfig) -> Vec<GestureKind> {
    let mut gestures = Vec::new();
    if is_thumbs_down(hand) {
        gestures.push(GestureKind::ThumbsDown);
    }
    if is_open_palm(hand) {
        gestures.push(GestureKind::OpenPalm);
    }
    if is_closed_fist(hand) {
        gestures.push(GestureKind::ClosedFist);
    }
    if is_v_sign(hand) {
        gestures.push(GestureKind::VSign);
    }
    if is_tap(hand, config) {
        gestures.push(GestureKind::Tap);
    }
    gestures
}
