//! Gesture control library: hand and face landmarks in, debounced actions out.
//!
//! This library turns a noisy stream of normalized landmark coordinates into
//! pointer moves, clicks, drags, scrolls, photo and video capture, and an exit
//! signal, at camera frame rate and without triggering on single-frame jitter.
//!
//! The per-frame pipeline consists of:
//! 1. Feature extraction (distances, eye-aspect-ratio, finger states)
//! 2. Temporal smoothing of noisy signals and fingertip trajectories
//! 3. Stateless gesture classifiers
//! 4. Debounce and cooldown control for edge-triggered gestures
//! 5. Action dispatch and continuous drag / scroll / recording state
//!
//! Landmark detection, pointer injection and file output are behind traits
//! in [`media`] and [`input`], so the pipeline runs the same from a camera,
//! a recorded landmark stream or a test.
//!
//! # Examples
//!
//! ## Replaying a landmark stream
//!
//! ```no_run
//! use gesture_control::{
//!     app::{GestureSession, SystemClock},
//!     config::{Config, Profile},
//!     input::RecordedInput,
//!     media::{NoDisplay, RecordedMedia},
//!     replay::{ReplayEstimator, ReplaySource},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::for_profile(Profile::Mouse);
//! let mut session = GestureSession::new(config, RecordedInput::default(), RecordedMedia::new())?;
//!
//! let mut source = ReplaySource::open("session.jsonl")?;
//! let summary = session.run(&mut source, &mut ReplayEstimator, &mut NoDisplay, &SystemClock::new());
//!
//! println!("{} frames, stopped by {}", summary.frames_processed, summary.exit_reason);
//! println!("{:?}", session.input().actions());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the classifiers directly
//!
//! ```
//! use gesture_control::{
//!     config::HandConfig,
//!     debounce::Debouncer,
//!     features::{extract_hand, FrameGeometry},
//!     gestures::is_tap,
//!     landmarks::{LandmarkSet, Point},
//! };
//! use std::time::Duration;
//!
//! let mut points = vec![Point::new(0.5, 0.5); 21];
//! points[4] = Point::new(0.50, 0.52); // thumb tip
//! points[8] = Point::new(0.51, 0.50); // index tip
//! let hand = extract_hand(&LandmarkSet::new(points), FrameGeometry::new(640, 480)).unwrap();
//!
//! let mut tap = Debouncer::on_set(Duration::from_millis(250));
//! assert!(tap.update(is_tap(&hand, &HandConfig::default()), Duration::ZERO));
//! assert!(!tap.update(is_tap(&hand, &HandConfig::default()), Duration::from_millis(100)));
//! ```

/// Landmark points, sets and per-frame detections
pub mod landmarks;

/// Feature extraction from landmark sets
pub mod features;

/// Bounded signal histories and fingertip trajectories
pub mod smoothing;

/// Stateless gesture classifiers
pub mod gestures;

/// Debounce and cooldown control
pub mod debounce;

/// Action dispatch and continuous state
pub mod dispatcher;

/// Main application module
pub mod app;

/// Pointer and button control abstraction
pub mod input;

/// Cursor control module for X11 systems
pub mod cursor_control;

/// Frame, estimator, media and display abstractions
pub mod media;

/// JSON-lines landmark replay
pub mod replay;

/// External landmark detector process
pub mod bridge;

/// `OpenCV` camera, media and display backends
#[cfg(feature = "opencv")]
pub mod camera;

/// Utility functions for numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
