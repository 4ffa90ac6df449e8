//! Landmark files replayed through a full session

mod test_helpers;

use gesture_control::{
    app::{ExitReason, GestureSession, ManualClock},
    config::{Config, Profile},
    input::{InputCommand, RecordedInput},
    landmarks::{Detection, Point},
    media::{MediaCommand, NoDisplay, RecordedMedia},
    replay::{write_records, ReplayEstimator, ReplayFrame, ReplayRecord, ReplaySource},
    Error,
};
use std::{fs::File, io::Write, path::PathBuf};
use tempfile::TempDir;
use test_helpers::*;

const UNIX_START: i64 = 1_700_000_000;

type ReplaySession = GestureSession<ReplayFrame, RecordedInput, RecordedMedia>;

fn replay_session(config: Config) -> ReplaySession {
    GestureSession::new(config, RecordedInput::default(), RecordedMedia::new()).unwrap()
}

fn write_fixture(dir: &TempDir, name: &str, records: &[ReplayRecord]) -> PathBuf {
    let path = dir.path().join(name);
    let file = File::create(&path).unwrap();
    write_records(file, records).unwrap();
    path
}

/// Index tip moving down-left for ten steps, then down-right
fn air_v_records() -> Vec<ReplayRecord> {
    (0..=20)
        .map(|k| {
            let x = if k <= 10 {
                0.6 - 0.0125 * f64::from(k)
            } else {
                0.475 + 0.0125 * f64::from(k - 10)
            };
            let y = 0.2 + 0.02 * f64::from(k);
            ReplayRecord::new(Some(f64::from(k) * 0.05), hand_only(pointing(Point::new(x, y))))
        })
        .collect()
}

#[test]
fn test_air_v_starts_named_recording() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "air_v.jsonl", &air_v_records());

    let mut source = ReplaySource::open(&path).unwrap();
    let mut session = replay_session(Config::for_profile(Profile::Air));
    let summary = session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &ManualClock::new(UNIX_START));

    assert_eq!(summary.exit_reason, ExitReason::EndOfStream);
    assert_eq!(summary.frames_processed, 21);

    let media = session.media();
    assert_eq!(media.opened(), 1);
    assert_eq!(
        media.commands()[0],
        MediaCommand::OpenVideo {
            id: 0,
            path: PathBuf::from(format!("./v_draw_record_{UNIX_START}.avi")),
            fps: 20.0,
            size: (640, 480),
        }
    );
    // Shape completes at the 16th point; frames 15..=20 are recorded
    assert_eq!(media.frames_written(0), 6);
    // End of stream closes the open recording
    assert_eq!(media.closed(), 1);
    assert!(session.trajectory().len() < 10);
}

#[test]
fn test_pause_splits_air_v_trajectory() {
    let dir = TempDir::new().unwrap();
    // A minute without a hand between the two strokes
    let records: Vec<ReplayRecord> = air_v_records()
        .into_iter()
        .enumerate()
        .map(|(k, mut record)| {
            if k > 10 {
                record.t = record.t.map(|t| t + 60.0);
            }
            record
        })
        .collect();
    let path = write_fixture(&dir, "split_v.jsonl", &records);

    let mut source = ReplaySource::open(&path).unwrap();
    let mut session = replay_session(Config::for_profile(Profile::Air));
    let summary = session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &ManualClock::new(UNIX_START));

    assert_eq!(summary.frames_processed, 21);
    assert_eq!(session.media().opened(), 0);
    // Only the second stroke is left
    assert_eq!(session.trajectory().len(), 10);
}

#[test]
fn test_air_v_ignored_by_camera_profile() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "air_v.jsonl", &air_v_records());

    let mut source = ReplaySource::open(&path).unwrap();
    let mut session = replay_session(Config::for_profile(Profile::Camera));
    session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &ManualClock::new(UNIX_START));

    assert!(session.media().commands().is_empty());
}

#[test]
fn test_mouse_taps_from_file_with_noise() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taps.jsonl");

    let touch = ReplayRecord::new(None, hand_only(pinch(0.045)));
    let mut file = File::create(&path).unwrap();
    writeln!(file, "# tap every 0.1 s").unwrap();
    for (i, t) in [0.0, 0.1, 0.2, 0.3].iter().enumerate() {
        let record = ReplayRecord { t: Some(*t), ..touch.clone() };
        writeln!(file, "{}", record.to_line().unwrap()).unwrap();
        if i == 1 {
            writeln!(file, "{{\"hands\": [[[0.1, 0.2]").unwrap();
            writeln!(file).unwrap();
        }
    }
    drop(file);

    let mut source = ReplaySource::open(&path).unwrap();
    let mut session = replay_session(Config::for_profile(Profile::Mouse));
    let summary = session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &ManualClock::new(0));

    assert_eq!(summary.frames_processed, 4);
    // Clicks at 0.0 and 0.3; 0.1 and 0.2 fall inside the cooldown
    assert_eq!(session.input().count(InputCommand::Click), 2);
    let moves = session
        .input()
        .commands()
        .iter()
        .filter(|c| matches!(c, InputCommand::MoveTo { .. }))
        .count();
    assert_eq!(moves, 4);
    assert_eq!(session.input().count(InputCommand::MouseDown), 0);
}

#[test]
fn test_untimed_frames_use_session_clock() {
    let dir = TempDir::new().unwrap();
    let records = vec![ReplayRecord::new(None, hand_only(pinch(0.045))); 5];
    let path = write_fixture(&dir, "untimed.jsonl", &records);

    let mut config = Config::for_profile(Profile::Mouse);
    config.actions.pointer = false;
    let mut source = ReplaySource::open(&path).unwrap();
    let mut session = replay_session(config);
    // A clock that never advances puts every frame at the same instant
    session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &ManualClock::new(0));

    assert_eq!(session.input().count(InputCommand::Click), 1);
}

#[test]
fn test_empty_and_malformed_detections_do_nothing() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        ReplayRecord::new(Some(0.0), Detection::empty()),
        // Too few points for a hand or a face
        ReplayRecord::new(
            Some(0.05),
            Detection {
                hands: vec![gesture_control::landmarks::LandmarkSet::new(vec![Point::new(0.5, 0.5); 3])],
                faces: vec![gesture_control::landmarks::LandmarkSet::new(vec![Point::new(0.5, 0.5); 10])],
            },
        ),
    ];
    let path = write_fixture(&dir, "noise.jsonl", &records);

    let mut source = ReplaySource::open(&path).unwrap();
    let mut session = replay_session(Config::for_profile(Profile::All));
    let summary = session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &ManualClock::new(0));

    assert_eq!(summary.frames_processed, 2);
    assert!(session.input().commands().is_empty());
    assert!(session.media().commands().is_empty());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = ReplaySource::open(dir.path().join("missing.jsonl"));
    assert!(matches!(result, Err(Error::Io(_))));
}
