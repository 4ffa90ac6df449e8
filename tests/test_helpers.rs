//! Helper functions and utilities for tests
#![allow(dead_code)]

use gesture_control::{
    app::GestureSession,
    config::Config,
    constants::{LEFT_EYE, MIN_FACE_LANDMARKS, NUM_HAND_LANDMARKS, RIGHT_EYE},
    input::RecordedInput,
    landmarks::{hand, Detection, LandmarkSet, Point},
    media::{Frame, RecordedMedia},
};
use std::time::Duration;

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

/// Pixel-less frame with the nominal test size
#[derive(Debug, Clone, Copy, Default)]
pub struct TestFrame;

impl Frame for TestFrame {
    fn dimensions(&self) -> (u32, u32) {
        (FRAME_WIDTH, FRAME_HEIGHT)
    }
}

pub type TestSession = GestureSession<TestFrame, RecordedInput, RecordedMedia>;

/// Session over recording backends
pub fn session(config: Config) -> TestSession {
    GestureSession::new(config, RecordedInput::default(), RecordedMedia::new()).unwrap()
}

pub fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

/// Synthetic 21-point hand, upright, fingers curled unless opened
#[derive(Debug, Clone)]
pub struct HandBuilder {
    points: Vec<Point>,
}

impl HandBuilder {
    pub fn new() -> Self {
        let mut points = vec![Point::new(0.5, 0.9); NUM_HAND_LANDMARKS];

        points[hand::THUMB_CMC] = Point::new(0.42, 0.82);
        points[hand::THUMB_MCP] = Point::new(0.40, 0.75);
        points[hand::THUMB_IP] = Point::new(0.38, 0.70);
        points[hand::THUMB_TIP] = Point::new(0.36, 0.66);

        for (tip, x) in [
            (hand::INDEX_TIP, 0.45),
            (hand::MIDDLE_TIP, 0.50),
            (hand::RING_TIP, 0.55),
            (hand::PINKY_TIP, 0.60),
        ] {
            points[tip - 3] = Point::new(x, 0.70); // MCP
            points[tip - 2] = Point::new(x, 0.60); // PIP
            points[tip - 1] = Point::new(x, 0.58); // DIP
            points[tip] = Point::new(x, 0.65); // curled below the PIP
        }

        Self { points }
    }

    /// Extend or curl the finger ending at `tip`
    pub fn finger(mut self, tip: usize, open: bool) -> Self {
        let pip = self.points[tip - 2];
        self.points[tip] = Point::new(pip.x, if open { pip.y - 0.2 } else { pip.y + 0.05 });
        self
    }

    /// Extended index finger ending at `tip`
    pub fn index_at(mut self, tip: Point) -> Self {
        self.points[hand::INDEX_PIP] = Point::new(tip.x, tip.y + 0.1);
        self.points[hand::INDEX_TIP] = tip;
        self
    }

    /// Middle fingertip at `tip`, extended
    pub fn middle_at(mut self, tip: Point) -> Self {
        self.points[hand::MIDDLE_PIP] = Point::new(tip.x, tip.y + 0.1);
        self.points[hand::MIDDLE_TIP] = tip;
        self
    }

    pub fn thumb_tip(mut self, tip: Point) -> Self {
        self.points[hand::THUMB_TIP] = tip;
        self
    }

    /// Thumb tip hanging below its IP joint and the index knuckle
    pub fn thumb_down(mut self) -> Self {
        self.points[hand::THUMB_TIP] = Point::new(0.38, 0.85);
        self
    }

    pub fn build(self) -> LandmarkSet {
        LandmarkSet::new(self.points)
    }
}

impl Default for HandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn fist() -> LandmarkSet {
    HandBuilder::new().build()
}

pub fn open_palm() -> LandmarkSet {
    HandBuilder::new()
        .finger(hand::INDEX_TIP, true)
        .finger(hand::MIDDLE_TIP, true)
        .finger(hand::RING_TIP, true)
        .finger(hand::PINKY_TIP, true)
        .build()
}

pub fn v_sign() -> LandmarkSet {
    HandBuilder::new()
        .finger(hand::INDEX_TIP, true)
        .finger(hand::MIDDLE_TIP, true)
        .build()
}

pub fn thumbs_down() -> LandmarkSet {
    HandBuilder::new().thumb_down().build()
}

/// Pointing hand with the index tip at `tip`
pub fn pointing(tip: Point) -> LandmarkSet {
    HandBuilder::new().index_at(tip).build()
}

/// Index tip and thumb tip `distance` apart, middle finger curled away
pub fn pinch(distance: f64) -> LandmarkSet {
    HandBuilder::new()
        .index_at(Point::new(0.5, 0.4))
        .thumb_tip(Point::new(0.5 + distance, 0.4))
        .build()
}

/// Index and middle tips `distance` apart around height `y`, thumb away
pub fn two_fingers(distance: f64, y: f64) -> LandmarkSet {
    HandBuilder::new()
        .index_at(Point::new(0.5, y))
        .middle_at(Point::new(0.5 + distance, y))
        .thumb_tip(Point::new(0.2, 0.7))
        .build()
}

/// Face mesh whose eyes both measure `ear` at the test frame size
pub fn face_with_ear(ear: f64) -> LandmarkSet {
    let mut points = vec![Point::new(0.5, 0.5); MIN_FACE_LANDMARKS];

    let half_width = 0.03;
    let width_px = 2.0 * half_width * f64::from(FRAME_WIDTH);
    // (2 * 2 * d * h) / (2 * width_px) = ear
    let half_height = ear * width_px / (2.0 * f64::from(FRAME_HEIGHT));

    for (eye, cx) in [(LEFT_EYE, 0.4), (RIGHT_EYE, 0.6)] {
        let cy = 0.4;
        points[eye[0]] = Point::new(cx - half_width, cy);
        points[eye[3]] = Point::new(cx + half_width, cy);
        points[eye[1]] = Point::new(cx - half_width / 3.0, cy - half_height);
        points[eye[5]] = Point::new(cx - half_width / 3.0, cy + half_height);
        points[eye[2]] = Point::new(cx + half_width / 3.0, cy - half_height);
        points[eye[4]] = Point::new(cx + half_width / 3.0, cy + half_height);
    }

    LandmarkSet::new(points)
}

pub fn hand_only(set: LandmarkSet) -> Detection {
    Detection {
        hands: vec![set],
        faces: Vec::new(),
    }
}

pub fn face_only(set: LandmarkSet) -> Detection {
    Detection {
        hands: Vec::new(),
        faces: vec![set],
    }
}
