//! Performance benchmarks for the per-frame gesture pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gesture_control::{
    app::GestureSession,
    config::{AirVConfig, Config, Profile},
    constants::{LEFT_EYE, MIN_FACE_LANDMARKS, RIGHT_EYE},
    features::{extract, FrameGeometry},
    gestures::is_air_v,
    input::RecordedInput,
    landmarks::{Detection, LandmarkSet, PixelPoint, Point},
    media::{Frame, RecordedMedia},
    smoothing::{SignalHistory, Trajectory},
};
use std::time::Duration;

struct BenchFrame;

impl Frame for BenchFrame {
    fn dimensions(&self) -> (u32, u32) {
        (640, 480)
    }
}

/// Hand with the index tip wandering around the frame centre
fn hand(i: usize) -> LandmarkSet {
    let t = i as f64 * 0.05;
    let mut points: Vec<Point> = (0..21)
        .map(|j| Point::new(0.4 + 0.01 * j as f64, 0.8 - 0.02 * (j % 4) as f64))
        .collect();
    points[8] = Point::new(0.5 + 0.1 * t.sin(), 0.4 + 0.1 * t.cos());
    points[4] = Point::new(0.5 + 0.1 * t.sin() + 0.02 + 0.03 * (t * 3.0).sin(), 0.42);
    LandmarkSet::new(points)
}

fn face(i: usize) -> LandmarkSet {
    let mut points = vec![Point::new(0.5, 0.5); MIN_FACE_LANDMARKS];
    let half_height = if i % 20 < 4 { 0.002 } else { 0.01 };
    for (eye, cx) in [(LEFT_EYE, 0.4), (RIGHT_EYE, 0.6)] {
        points[eye[0]] = Point::new(cx - 0.03, 0.4);
        points[eye[3]] = Point::new(cx + 0.03, 0.4);
        points[eye[1]] = Point::new(cx - 0.01, 0.4 - half_height);
        points[eye[5]] = Point::new(cx - 0.01, 0.4 + half_height);
        points[eye[2]] = Point::new(cx + 0.01, 0.4 - half_height);
        points[eye[4]] = Point::new(cx + 0.01, 0.4 + half_height);
    }
    LandmarkSet::new(points)
}

fn detections(count: usize) -> Vec<Detection> {
    (0..count)
        .map(|i| Detection {
            hands: vec![hand(i)],
            faces: vec![face(i)],
        })
        .collect()
}

/// Benchmark feature extraction for a hand plus a face mesh
fn bench_extract(c: &mut Criterion) {
    let detection = &detections(1)[0];
    let geometry = FrameGeometry::new(640, 480);

    c.bench_function("extract_hand_and_face", |b| {
        b.iter(|| black_box(extract(black_box(detection), geometry, Duration::ZERO)))
    });
}

/// Benchmark full sessions over a pre-built landmark stream
fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_process");
    let stream = detections(300);

    for profile in [Profile::Mouse, Profile::Camera, Profile::All] {
        group.bench_with_input(BenchmarkId::new("frames_300", profile), &profile, |b, &profile| {
            b.iter(|| {
                let mut session: GestureSession<BenchFrame, RecordedInput, RecordedMedia> =
                    GestureSession::new(Config::for_profile(profile), RecordedInput::default(), RecordedMedia::new())
                        .unwrap();
                for (i, detection) in stream.iter().enumerate() {
                    let now = Duration::from_millis(i as u64 * 33);
                    black_box(session.process(&BenchFrame, detection, now, 0));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark the smoothing window and the air-V shape test
fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");

    for window in [1, 5, 15] {
        group.bench_with_input(BenchmarkId::new("ear_push_mean", window), &window, |b, &window| {
            let mut history = SignalHistory::new(window);
            let mut value = 0.3;
            b.iter(|| {
                value = if value > 0.3 { 0.2 } else { 0.31 };
                black_box(history.push_mean(value))
            });
        });
    }

    let config = AirVConfig::default();
    let mut trajectory = Trajectory::new(config.capacity);
    for k in 0..config.capacity {
        let x = if k < 10 { 400.0 - 8.0 * k as f64 } else { 320.0 + 8.0 * (k - 10) as f64 };
        trajectory.push(PixelPoint::new(x, 100.0 + 10.0 * k as f64));
    }
    group.bench_function("air_v_check", |b| b.iter(|| black_box(is_air_v(black_box(&trajectory), &config))));

    group.finish();
}

criterion_group!(benches, bench_extract, bench_session, bench_smoothing);
criterion_main!(benches);
