//! Error handling tests for all modules

mod test_helpers;

use gesture_control::{
    app::{ExitReason, GestureSession, ManualClock},
    config::{Config, Profile},
    error::{AppError, Result},
    features::{eye_aspect_ratio, extract, extract_face, extract_hand, finger_open, FrameGeometry},
    input::{InputController, RecordedInput},
    landmarks::{Detection, LandmarkSet, PixelPoint, Point},
    media::{FrameSource, LandmarkEstimator, MediaSink, NoDisplay, RecordedMedia},
    utils::safe_cast::*,
};
use std::{path::Path, time::Duration};
use test_helpers::*;

/// Input backend whose every command fails
struct BrokenInput;

impl InputController for BrokenInput {
    fn screen_size(&self) -> (u32, u32) {
        (1920, 1080)
    }

    fn move_to(&mut self, _x: i32, _y: i32) -> Result<()> {
        Err(AppError::CursorControl("no display".to_string()))
    }

    fn mouse_down(&mut self) -> Result<()> {
        Err(AppError::CursorControl("no display".to_string()))
    }

    fn mouse_up(&mut self) -> Result<()> {
        Err(AppError::CursorControl("no display".to_string()))
    }

    fn click(&mut self) -> Result<()> {
        Err(AppError::CursorControl("no display".to_string()))
    }

    fn scroll(&mut self, _delta: i32) -> Result<()> {
        Err(AppError::CursorControl("no display".to_string()))
    }
}

/// Media sink that can be told to fail opening or closing streams
#[derive(Default)]
struct FlakyMedia {
    fail_open: bool,
    fail_close: bool,
    opened: usize,
    close_attempts: usize,
}

impl<F> MediaSink<F> for FlakyMedia {
    type Video = ();

    fn save_image(&mut self, path: &Path, _frame: &F) -> Result<()> {
        Err(AppError::Media(format!("cannot write {}", path.display())))
    }

    fn open_video(&mut self, path: &Path, _fps: f64, _size: (u32, u32)) -> Result<()> {
        if self.fail_open {
            return Err(AppError::Media(format!("cannot open {}", path.display())));
        }
        self.opened += 1;
        Ok(())
    }

    fn write_frame(&mut self, _video: &mut (), _frame: &F) -> Result<()> {
        Ok(())
    }

    fn close_video(&mut self, _video: ()) -> Result<()> {
        self.close_attempts += 1;
        if self.fail_close {
            return Err(AppError::Media("disk full".to_string()));
        }
        Ok(())
    }
}

#[test]
fn test_malformed_landmark_sets() {
    let geometry = FrameGeometry::new(640, 480);
    let short = LandmarkSet::new(vec![Point::new(0.5, 0.5); 3]);

    match extract_hand(&short, geometry) {
        Err(AppError::Landmarks(msg)) => assert!(msg.contains("21")),
        other => panic!("Expected Landmarks error, got {other:?}"),
    }
    assert!(extract_face(&short, geometry).is_err());
    assert!(short.get(8).is_err());

    // The snapshot skips the broken modality instead of failing
    let snapshot = extract(
        &Detection {
            hands: vec![short],
            faces: Vec::new(),
        },
        geometry,
        Duration::ZERO,
    );
    assert!(snapshot.hand.is_none());
    assert!(snapshot.face.is_none());
}

#[test]
fn test_non_fingertip_rejected() {
    let hand = fist();
    assert!(matches!(finger_open(&hand, 1), Err(AppError::InvalidInput(_))));
    assert!(finger_open(&hand, 8).is_ok());
}

#[test]
fn test_degenerate_eye_has_no_ratio() {
    let collapsed = [PixelPoint::new(100.0, 100.0); 6];
    assert_eq!(eye_aspect_ratio(&collapsed), None);

    let mut session = session(Config::for_profile(Profile::Camera));
    let degenerate = LandmarkSet::new(vec![Point::new(0.5, 0.5); gesture_control::constants::MIN_FACE_LANDMARKS]);
    for i in 0..10 {
        let outcome = session.process(&TestFrame, &face_only(degenerate.clone()), secs(f64::from(i) * 0.05), 0);
        assert!(outcome.overlay.eye.is_none());
    }
    assert_eq!(session.smoothed_ear(), None);
    assert!(session.media().saved_images().is_empty());
}

#[test]
fn test_safe_cast_errors() {
    assert_eq!(f64_to_i32_trunc(f64::NAN), 0);
    assert_eq!(f64_to_i32_trunc(-2.6), -2);
    assert!(i32_to_u32(-1).is_err());
}

#[test]
fn test_failing_input_does_not_abort_frames() {
    let mut session: GestureSession<TestFrame, BrokenInput, RecordedMedia> =
        GestureSession::new(Config::for_profile(Profile::All), BrokenInput, RecordedMedia::new()).unwrap();

    // Tap and pinch at once: the click and the press both fail
    let outcome = session.process(&TestFrame, &hand_only(pinch(0.02)), Duration::ZERO, 0);
    assert!(outcome.fired(gesture_control::gestures::GestureKind::Tap));
    assert!(outcome.actions.is_empty());
    assert!(!session.state().drag_active);

    // Failed scrolls drop the baseline, so the next sample starts fresh
    for i in 1..4 {
        let y = 0.5 - 0.01 * f64::from(i);
        let outcome = session.process(&TestFrame, &hand_only(two_fingers(0.02, y)), secs(f64::from(i) * 0.1), 0);
        assert_eq!(outcome.scroll_delta, 0);
    }

    session.shutdown();
}

#[test]
fn test_failing_media_keeps_state_consistent() {
    let media = FlakyMedia {
        fail_open: true,
        ..FlakyMedia::default()
    };
    let mut session: GestureSession<TestFrame, RecordedInput, FlakyMedia> =
        GestureSession::new(Config::for_profile(Profile::Camera), RecordedInput::default(), media).unwrap();

    session.process(&TestFrame, &hand_only(v_sign()), Duration::ZERO, 0);
    assert!(!session.state().recording_active());
    assert_eq!(session.media().opened, 0);

    // A failed photo is logged and skipped
    let outcome = session.process(&TestFrame, &hand_only(fist()), secs(0.05), 0);
    assert!(outcome.actions.is_empty());

    let media = FlakyMedia {
        fail_close: true,
        ..FlakyMedia::default()
    };
    let mut session: GestureSession<TestFrame, RecordedInput, FlakyMedia> =
        GestureSession::new(Config::for_profile(Profile::Camera), RecordedInput::default(), media).unwrap();

    session.process(&TestFrame, &hand_only(v_sign()), Duration::ZERO, 0);
    assert!(session.state().recording_active());
    assert_eq!(session.media().opened, 1);
    session.process(&TestFrame, &hand_only(open_palm()), secs(0.05), 0);
    // The stream is forgotten even though closing failed
    assert!(!session.state().recording_active());
    assert_eq!(session.media().close_attempts, 1);
    session.shutdown();
    assert_eq!(session.media().close_attempts, 1);
}

#[test]
fn test_estimator_and_source_errors() {
    struct Failing {
        remaining: u32,
    }

    impl FrameSource for Failing {
        type Frame = TestFrame;

        fn next_frame(&mut self) -> Result<Option<TestFrame>> {
            if self.remaining == 0 {
                return Err(AppError::Media("camera unplugged".to_string()));
            }
            self.remaining -= 1;
            Ok(Some(TestFrame))
        }
    }

    struct BrokenEstimator;

    impl LandmarkEstimator<TestFrame> for BrokenEstimator {
        fn detect(&mut self, _frame: &TestFrame) -> Result<Detection> {
            Err(AppError::Bridge("detector crashed".to_string()))
        }
    }

    let mut session = session(Config::for_profile(Profile::All));
    let summary = session.run(
        &mut Failing { remaining: 3 },
        &mut BrokenEstimator,
        &mut NoDisplay,
        &ManualClock::new(0),
    );

    assert_eq!(summary.exit_reason, ExitReason::EndOfStream);
    assert_eq!(summary.frames_processed, 3);
    assert!(session.input().commands().is_empty());
}

#[test]
fn test_error_display() {
    let err = AppError::ConfigError("Recording FPS must be greater than 0".to_string());
    assert_eq!(err.to_string(), "Configuration error: Recording FPS must be greater than 0");

    let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert!(err.to_string().starts_with("JSON error"));
}
