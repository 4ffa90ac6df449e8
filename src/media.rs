//! Frame sources, image/video sinks and display, as seen by the session.
//!
//! The session never touches camera hardware, the landmark model or files
//! directly; it drives these traits. OpenCV-backed implementations live in
//! `camera` (feature `opencv`), JSON replay in [`crate::replay`], and
//! [`RecordedMedia`] / [`NoDisplay`] serve dry runs and tests.

use crate::{
    gestures::GestureKind,
    landmarks::{Detection, Point},
    Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// A captured image
pub trait Frame {
    /// Width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Capture time relative to the start of the stream, when the source
    /// knows it
    fn captured_at(&self) -> Option<Duration> {
        None
    }
}

/// Pull-based source of frames
pub trait FrameSource {
    type Frame: Frame;

    /// Next frame, or `None` at end of stream
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Maps a frame to the hands and faces found in it
pub trait LandmarkEstimator<F> {
    fn detect(&mut self, frame: &F) -> Result<Detection>;
}

/// Image and video persistence
pub trait MediaSink<F> {
    /// Handle to an open video stream
    type Video;

    fn save_image(&mut self, path: &Path, frame: &F) -> Result<()>;

    fn open_video(&mut self, path: &Path, fps: f64, size: (u32, u32)) -> Result<Self::Video>;

    fn write_frame(&mut self, video: &mut Self::Video, frame: &F) -> Result<()>;

    /// Finalize a stream; consuming the handle makes a second close impossible
    fn close_video(&mut self, video: Self::Video) -> Result<()>;
}

/// What the display asks the loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayControl {
    Continue,
    Quit,
}

/// Diagnostic annotations for one processed frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Short status labels such as "Tap!" or "Scroll 3"
    pub labels: Vec<String>,
    /// Normalized pointer position
    pub pointer: Option<Point>,
    /// Smoothed eye-aspect-ratio and whether it reads as closed
    pub eye: Option<(f64, bool)>,
    pub recording: bool,
}

/// Diagnostic output, not needed for correctness
pub trait DisplaySink<F> {
    fn show(&mut self, frame: &F, overlay: &Overlay) -> Result<DisplayControl>;
}

/// Display that shows nothing and never asks to quit
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl<F> DisplaySink<F> for NoDisplay {
    fn show(&mut self, _frame: &F, _overlay: &Overlay) -> Result<DisplayControl> {
        Ok(DisplayControl::Continue)
    }
}

/// Label used in file names for photos triggered by `kind`
#[must_use]
pub fn photo_label(kind: GestureKind) -> String {
    match kind {
        GestureKind::ClosedFist => "fist".to_string(),
        other => other.to_string(),
    }
}

/// Label used in file names for videos started by `kind`
#[must_use]
pub fn video_label(kind: GestureKind) -> String {
    match kind {
        GestureKind::VSign => "video".to_string(),
        GestureKind::AirV => "v_draw_record".to_string(),
        other => format!("{other}_record"),
    }
}

/// How photo file names are made unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoNaming {
    /// `{label}_photo_{counter}.jpg`, one counter for all labels
    #[default]
    Counter,
    /// `{label}_capture_{unix_seconds}.jpg`
    UnixTime,
}

/// Generates photo paths per [`PhotoNaming`] and `{label}_{unix_seconds}.avi`
/// video paths
#[derive(Debug, Clone)]
pub struct CaptureNamer {
    output_dir: PathBuf,
    naming: PhotoNaming,
    photo_counter: u32,
}

impl CaptureNamer {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, naming: PhotoNaming) -> Self {
        Self {
            output_dir: output_dir.into(),
            naming,
            photo_counter: 0,
        }
    }

    /// Path for the next photo taken at `unix_seconds`
    pub fn next_photo(&mut self, label: &str, unix_seconds: i64) -> PathBuf {
        self.photo_counter += 1;
        let name = match self.naming {
            PhotoNaming::Counter => format!("{label}_photo_{}.jpg", self.photo_counter),
            PhotoNaming::UnixTime => format!("{label}_capture_{unix_seconds}.jpg"),
        };
        self.output_dir.join(name)
    }

    /// Path for a video started at `unix_seconds`
    #[must_use]
    pub fn video(&self, label: &str, unix_seconds: i64) -> PathBuf {
        self.output_dir.join(format!("{label}_{unix_seconds}.avi"))
    }

    #[must_use]
    pub const fn photos_taken(&self) -> u32 {
        self.photo_counter
    }
}

/// A command received by [`RecordedMedia`]
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    SaveImage { path: PathBuf },
    OpenVideo { id: usize, path: PathBuf, fps: f64, size: (u32, u32) },
    WriteFrame { id: usize },
    CloseVideo { id: usize },
}

/// Handle issued by [`RecordedMedia`]
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedVideo {
    id: usize,
}

impl RecordedVideo {
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }
}

/// Media sink that records commands instead of writing files
#[derive(Debug, Clone, Default)]
pub struct RecordedMedia {
    commands: Vec<MediaCommand>,
    next_id: usize,
}

impl RecordedMedia {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[MediaCommand] {
        &self.commands
    }

    /// Paths of all saved images
    #[must_use]
    pub fn saved_images(&self) -> Vec<PathBuf> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                MediaCommand::SaveImage { path } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn opened(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MediaCommand::OpenVideo { .. }))
            .count()
    }

    #[must_use]
    pub fn closed(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MediaCommand::CloseVideo { .. }))
            .count()
    }

    /// Frames written to the video with `id`
    #[must_use]
    pub fn frames_written(&self, id: usize) -> usize {
        self.commands
            .iter()
            .filter(|c| **c == MediaCommand::WriteFrame { id })
            .count()
    }
}

impl<F> MediaSink<F> for RecordedMedia {
    type Video = RecordedVideo;

    fn save_image(&mut self, path: &Path, _frame: &F) -> Result<()> {
        info!("Saved {}", path.display());
        self.commands.push(MediaCommand::SaveImage { path: path.to_path_buf() });
        Ok(())
    }

    fn open_video(&mut self, path: &Path, fps: f64, size: (u32, u32)) -> Result<Self::Video> {
        let id = self.next_id;
        self.next_id += 1;
        info!("Opened video {} ({}x{} @ {} fps)", path.display(), size.0, size.1, fps);
        self.commands.push(MediaCommand::OpenVideo {
            id,
            path: path.to_path_buf(),
            fps,
            size,
        });
        Ok(RecordedVideo { id })
    }

    fn write_frame(&mut self, video: &mut Self::Video, _frame: &F) -> Result<()> {
        debug!("video {}: frame", video.id);
        self.commands.push(MediaCommand::WriteFrame { id: video.id });
        Ok(())
    }

    fn close_video(&mut self, video: Self::Video) -> Result<()> {
        info!("Closed video {}", video.id);
        self.commands.push(MediaCommand::CloseVideo { id: video.id });
        Ok(())
    }
}
