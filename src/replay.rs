//! Landmark streams recorded as JSON lines.
//!
//! Each non-blank line is one frame:
//!
//! ```text
//! {"t": 0.033, "hands": [[[0.5, 0.4], [0.51, 0.42], ...]], "faces": []}
//! ```
//!
//! `t` (seconds since stream start) is optional; without it the session
//! clock stamps the frame. `width`/`height` override the nominal frame size
//! used for pixel-space measurements. Lines starting with `#` are comments.
//!
//! A replayed frame carries its own detection, so [`ReplayEstimator`] only
//! hands it back. Together they let the whole pipeline run from a file, a
//! pipe on stdin, or a test fixture without a camera or a model.

use crate::{
    constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH},
    landmarks::{Detection, LandmarkSet},
    media::{Frame, FrameSource, LandmarkEstimator},
    Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Lines, StdinLock, Write},
    path::Path,
    time::Duration,
};

/// One line of a landmark stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplayRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub hands: Vec<LandmarkSet>,
    #[serde(default)]
    pub faces: Vec<LandmarkSet>,
}

impl ReplayRecord {
    /// Record with the given detection and timestamp
    #[must_use]
    pub fn new(t: Option<f64>, detection: Detection) -> Self {
        Self {
            t,
            width: None,
            height: None,
            hands: detection.hands,
            faces: detection.faces,
        }
    }

    /// Parse one line
    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Serialize as one line, without the trailing newline
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A replayed frame: its position in the stream plus what was detected
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub index: u64,
    pub timestamp: Option<Duration>,
    pub width: u32,
    pub height: u32,
    pub detection: Detection,
}

impl Frame for ReplayFrame {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn captured_at(&self) -> Option<Duration> {
        self.timestamp
    }
}

/// Frame source over a JSON-lines reader
pub struct ReplaySource<R> {
    lines: Lines<R>,
    line_number: usize,
    frames: u64,
    frame_size: (u32, u32),
}

impl ReplaySource<BufReader<File>> {
    /// Open a landmark file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Replaying landmarks from {}", path.display());
        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }
}

impl ReplaySource<StdinLock<'static>> {
    /// Read landmark lines piped on stdin
    #[must_use]
    pub fn stdin() -> Self {
        info!("Reading landmarks from stdin");
        Self::from_reader(io::stdin().lock())
    }
}

impl<R: BufRead> ReplaySource<R> {
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            frames: 0,
            frame_size: (DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT),
        }
    }

    /// Nominal frame size for records that do not carry one
    #[must_use]
    pub const fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// Frames produced so far
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    fn make_frame(&mut self, record: ReplayRecord) -> ReplayFrame {
        let timestamp = record.t.and_then(|t| match Duration::try_from_secs_f64(t) {
            Ok(timestamp) => Some(timestamp),
            Err(_) => {
                warn!("line {}: ignoring invalid timestamp {}", self.line_number, t);
                None
            }
        });

        let frame = ReplayFrame {
            index: self.frames,
            timestamp,
            width: record.width.unwrap_or(self.frame_size.0),
            height: record.height.unwrap_or(self.frame_size.1),
            detection: Detection {
                hands: record.hands,
                faces: record.faces,
            },
        };
        self.frames += 1;
        frame
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    type Frame = ReplayFrame;

    fn next_frame(&mut self) -> Result<Option<ReplayFrame>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match ReplayRecord::from_line(trimmed) {
                Ok(record) => {
                    debug!(
                        "line {}: {} hand(s), {} face(s)",
                        self.line_number,
                        record.hands.len(),
                        record.faces.len()
                    );
                    return Ok(Some(self.make_frame(record)));
                }
                Err(e) => warn!("Skipping line {}: {}", self.line_number, e),
            }
        }
        Ok(None)
    }
}

/// Estimator for frames that already carry their detection
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayEstimator;

impl LandmarkEstimator<ReplayFrame> for ReplayEstimator {
    fn detect(&mut self, frame: &ReplayFrame) -> Result<Detection> {
        Ok(frame.detection.clone())
    }
}

/// Write records as a landmark stream
pub fn write_records<W: Write>(mut writer: W, records: &[ReplayRecord]) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", record.to_line()?)?;
    }
    writer.flush()?;
    Ok(())
}
