//! Feature extraction from raw landmark sets.
//!
//! Every measurement here is a pure function of landmark coordinates. Hand
//! features stay in normalized units so the gesture thresholds do not depend
//! on camera resolution; the eye-aspect-ratio and the fingertip trajectory
//! point are measured in frame pixels because both are defined on the image.

use crate::{
    constants::{EPSILON, LEFT_EYE, RIGHT_EYE},
    landmarks::{hand, Detection, LandmarkSet, PixelPoint, Point},
    Error, Result,
};
use log::{debug, warn};
use std::time::Duration;

/// Pixel size of the frame the landmarks were detected in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Open/closed state of each finger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    /// Index, middle, ring and pinky in that order
    #[must_use]
    pub const fn non_thumb(&self) -> [bool; 4] {
        [self.index, self.middle, self.ring, self.pinky]
    }

    /// Number of open non-thumb fingers
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.non_thumb().iter().filter(|open| **open).count()
    }
}

/// Measurements taken from one hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    /// Distance between index tip and thumb tip
    pub index_thumb_distance: f64,
    /// Distance between index tip and middle tip
    pub index_middle_distance: f64,
    pub fingers: FingerStates,
    /// How far the thumb tip hangs below the lower of the thumb IP joint and
    /// the index base joint; positive means the thumb points down
    pub thumb_drop: f64,
    /// Index fingertip, the pointer position
    pub index_tip: Point,
    /// Index fingertip in frame pixels, the trajectory sample
    pub index_tip_px: PixelPoint,
    /// Midpoint of index and middle tips, the scroll reference
    pub scroll_anchor: Point,
}

/// Measurements taken from one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFeatures {
    /// Mean of both eyes, `None` when either eye contour is degenerate
    pub eye_aspect_ratio: Option<f64>,
    pub left_ear: Option<f64>,
    pub right_ear: Option<f64>,
}

/// A single named feature value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Scalar(f64),
    Flag(bool),
}

/// Everything measured in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSnapshot {
    pub timestamp: Duration,
    pub hand: Option<HandFeatures>,
    pub face: Option<FaceFeatures>,
}

impl FeatureSnapshot {
    /// A snapshot with no measurements
    #[must_use]
    pub const fn empty(timestamp: Duration) -> Self {
        Self {
            timestamp,
            hand: None,
            face: None,
        }
    }

    /// Look up a feature by name, e.g. `index_thumb_distance` or `finger_open[1]`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        if let Some(index) = name
            .strip_prefix("finger_open[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let fingers = self.hand?.fingers;
            let states = [fingers.thumb, fingers.index, fingers.middle, fingers.ring, fingers.pinky];
            return index.parse::<usize>().ok().and_then(|i| states.get(i)).map(|s| FeatureValue::Flag(*s));
        }

        match name {
            "index_thumb_distance" => self.hand.map(|h| FeatureValue::Scalar(h.index_thumb_distance)),
            "index_middle_distance" => self.hand.map(|h| FeatureValue::Scalar(h.index_middle_distance)),
            "thumb_drop" => self.hand.map(|h| FeatureValue::Scalar(h.thumb_drop)),
            "eye_aspect_ratio" => self.face?.eye_aspect_ratio.map(FeatureValue::Scalar),
            _ => None,
        }
    }
}

/// Distance between two named landmarks of a set
///
/// # Errors
///
/// Returns an error if either landmark is missing
pub fn landmark_distance(set: &LandmarkSet, a: usize, b: usize) -> Result<f64> {
    Ok(set.get(a)?.distance(&set.get(b)?))
}

/// Eye-aspect-ratio of a six-point eye contour
///
/// Returns `None` when the horizontal reference distance is zero.
#[must_use]
pub fn eye_aspect_ratio(eye: &[PixelPoint; 6]) -> Option<f64> {
    let vertical1 = eye[1].distance(&eye[5]);
    let vertical2 = eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);

    if horizontal < EPSILON {
        return None;
    }

    Some((vertical1 + vertical2) / (2.0 * horizontal))
}

/// A finger is open when its tip is above the joint two below it
///
/// # Errors
///
/// Returns an error if the tip or its reference joint is missing
pub fn finger_open(set: &LandmarkSet, tip: usize) -> Result<bool> {
    let reference = tip
        .checked_sub(2)
        .ok_or_else(|| Error::InvalidInput(format!("landmark {tip} is not a fingertip")))?;
    Ok(set.get(tip)?.y < set.get(reference)?.y)
}

/// The thumb is open when its tip reaches further sideways from the thumb
/// base than the IP joint does
///
/// # Errors
///
/// Returns an error if a thumb landmark is missing
pub fn thumb_open(set: &LandmarkSet) -> Result<bool> {
    let base = set.get(hand::THUMB_MCP)?;
    let ip = set.get(hand::THUMB_IP)?;
    let tip = set.get(hand::THUMB_TIP)?;
    Ok((tip.x - base.x).abs() > (ip.x - base.x).abs())
}

/// Extract hand features from a 21-point set
///
/// # Errors
///
/// Returns an error if the set is not a hand
pub fn extract_hand(set: &LandmarkSet, geometry: FrameGeometry) -> Result<HandFeatures> {
    set.expect_hand()?;

    let index_tip = set.get(hand::INDEX_TIP)?;
    let middle_tip = set.get(hand::MIDDLE_TIP)?;
    let thumb_tip = set.get(hand::THUMB_TIP)?;
    let thumb_ip = set.get(hand::THUMB_IP)?;
    let index_mcp = set.get(hand::INDEX_MCP)?;

    let fingers = FingerStates {
        thumb: thumb_open(set)?,
        index: finger_open(set, hand::INDEX_TIP)?,
        middle: finger_open(set, hand::MIDDLE_TIP)?,
        ring: finger_open(set, hand::RING_TIP)?,
        pinky: finger_open(set, hand::PINKY_TIP)?,
    };

    Ok(HandFeatures {
        index_thumb_distance: index_tip.distance(&thumb_tip),
        index_middle_distance: index_tip.distance(&middle_tip),
        fingers,
        thumb_drop: (thumb_tip.y - thumb_ip.y).min(thumb_tip.y - index_mcp.y),
        index_tip,
        index_tip_px: index_tip.to_pixels(geometry.width, geometry.height),
        scroll_anchor: index_tip.midpoint(&middle_tip),
    })
}

fn eye_contour(set: &LandmarkSet, indices: &[usize; 6], geometry: FrameGeometry) -> Result<[PixelPoint; 6]> {
    let mut contour = [PixelPoint::default(); 6];
    for (slot, index) in contour.iter_mut().zip(indices) {
        *slot = set.get(*index)?.to_pixels(geometry.width, geometry.height);
    }
    Ok(contour)
}

/// Extract face features from a face-mesh set
///
/// # Errors
///
/// Returns an error if the set is not a face mesh
pub fn extract_face(set: &LandmarkSet, geometry: FrameGeometry) -> Result<FaceFeatures> {
    set.expect_face()?;

    let left_ear = eye_aspect_ratio(&eye_contour(set, &LEFT_EYE, geometry)?);
    let right_ear = eye_aspect_ratio(&eye_contour(set, &RIGHT_EYE, geometry)?);

    let eye_aspect_ratio = match (left_ear, right_ear) {
        (Some(left), Some(right)) => Some((left + right) / 2.0),
        _ => None,
    };

    Ok(FaceFeatures {
        eye_aspect_ratio,
        left_ear,
        right_ear,
    })
}

/// Build the snapshot for one frame from the primary hand and face
///
/// A malformed set is reported and that modality is skipped for the frame.
#[must_use]
pub fn extract(detection: &Detection, geometry: FrameGeometry, timestamp: Duration) -> FeatureSnapshot {
    let hand = detection.primary_hand().and_then(|set| match extract_hand(set, geometry) {
        Ok(features) => Some(features),
        Err(e) => {
            warn!("Skipping hand for this frame: {}", e);
            None
        }
    });

    let face = detection.primary_face().and_then(|set| match extract_face(set, geometry) {
        Ok(features) => Some(features),
        Err(e) => {
            warn!("Skipping face for this frame: {}", e);
            None
        }
    });

    if let Some(h) = &hand {
        debug!(
            "hand: index-thumb {:.4} index-middle {:.4} open {:?}",
            h.index_thumb_distance,
            h.index_middle_distance,
            h.fingers.non_thumb()
        );
    }
    if let Some(f) = &face {
        debug!("face: ear {:?}", f.eye_aspect_ratio);
    }

    FeatureSnapshot { timestamp, hand, face }
}
