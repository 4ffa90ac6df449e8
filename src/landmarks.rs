//! Landmark sets produced by an external hand or face estimator.
//!
//! Points are normalized to `[0, 1]` in both axes, with `y` growing
//! downwards as in image coordinates.

use crate::{
    constants::{MIN_FACE_LANDMARKS, NUM_HAND_LANDMARKS},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Hand landmark indices (MediaPipe hand model convention)
pub mod hand {
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

    /// Tips of the four non-thumb fingers, index first
    pub const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

/// A normalized landmark point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PointRepr")]
pub struct Point {
    /// Horizontal position, 0 at the left edge
    pub x: f64,
    /// Vertical position, 0 at the top edge
    pub y: f64,
    /// Optional depth relative to the estimator's reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point {
    /// Create a 2-D point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Euclidean distance in the image plane
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint of two points in the image plane
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Scale to pixel space of a `width` x `height` surface
    #[must_use]
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelPoint {
        PixelPoint {
            x: self.x * f64::from(width),
            y: self.y * f64::from(height),
        }
    }
}

/// A point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Wire forms accepted for a point: `[x, y]`, `[x, y, z]` or `{x, y, z?}`
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Array(Vec<f64>),
    Object { x: f64, y: f64, z: Option<f64> },
}

impl TryFrom<PointRepr> for Point {
    type Error = String;

    fn try_from(repr: PointRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PointRepr::Array(values) => match values.as_slice() {
                [x, y] => Ok(Self::new(*x, *y)),
                [x, y, z] => Ok(Self { x: *x, y: *y, z: Some(*z) }),
                other => Err(format!("point needs 2 or 3 coordinates, got {}", other.len())),
            },
            PointRepr::Object { x, y, z } => Ok(Self { x, y, z }),
        }
    }
}

/// Ordered landmark points for one detected hand or face
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Landmark at `index`
    ///
    /// # Errors
    ///
    /// Returns an error if the set has no such landmark
    pub fn get(&self, index: usize) -> Result<Point> {
        self.points.get(index).copied().ok_or_else(|| {
            Error::Landmarks(format!(
                "landmark {index} requested from a set of {}",
                self.points.len()
            ))
        })
    }

    /// Check the set has the shape of a hand
    ///
    /// # Errors
    ///
    /// Returns an error unless the set has exactly 21 points
    pub fn expect_hand(&self) -> Result<()> {
        if self.points.len() == NUM_HAND_LANDMARKS {
            Ok(())
        } else {
            Err(Error::Landmarks(format!(
                "expected {NUM_HAND_LANDMARKS} hand landmarks, got {}",
                self.points.len()
            )))
        }
    }

    /// Check the set has the shape of a face mesh
    ///
    /// # Errors
    ///
    /// Returns an error if the set has fewer than 468 points
    pub fn expect_face(&self) -> Result<()> {
        if self.points.len() >= MIN_FACE_LANDMARKS {
            Ok(())
        } else {
            Err(Error::Landmarks(format!(
                "expected at least {MIN_FACE_LANDMARKS} face landmarks, got {}",
                self.points.len()
            )))
        }
    }
}

impl From<Vec<Point>> for LandmarkSet {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Everything the estimator found in one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub hands: Vec<LandmarkSet>,
    #[serde(default)]
    pub faces: Vec<LandmarkSet>,
}

impl Detection {
    /// A frame in which nothing was detected
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Only the primary hand is processed
    #[must_use]
    pub fn primary_hand(&self) -> Option<&LandmarkSet> {
        self.hands.first()
    }

    /// Only the primary face is processed
    #[must_use]
    pub fn primary_face(&self) -> Option<&LandmarkSet> {
        self.faces.first()
    }
}
