//! Landmark estimation through an external detector process.
//!
//! The detector is any program that speaks a small stdin/stdout protocol:
//!
//! 1. On start-up it prints a single `READY` line.
//! 2. For every frame it reads a 12-byte header (width, height, channels,
//!    each a little-endian `u32`) followed by `width * height * channels`
//!    raw pixel bytes.
//! 3. It answers with one JSON line
//!    `{"hands": [[[x, y], ...]], "faces": [...], "error": null}`
//!    using normalized coordinates.
//!
//! A MediaPipe wrapper script is the usual detector; this crate never links
//! the model itself.

use crate::{
    error::{AppError, Result},
    landmarks::{Detection, LandmarkSet},
    media::{Frame, LandmarkEstimator},
};
use log::{debug, info, warn};
use serde::Deserialize;
use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

/// A frame whose pixels can be handed to a detector
pub trait RawFrame: Frame {
    /// Interleaved bytes per pixel
    fn channels(&self) -> u32;

    /// Row-major pixel data, `width * height * channels` bytes
    fn pixel_bytes(&self) -> Result<&[u8]>;
}

/// Owned raw image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<u8>,
}

impl RawImage {
    /// Black image of the given size
    #[must_use]
    pub fn blank(width: u32, height: u32, channels: u32) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            data: vec![0; len],
        }
    }
}

impl Frame for RawImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl RawFrame for RawImage {
    fn channels(&self) -> u32 {
        self.channels
    }

    fn pixel_bytes(&self) -> Result<&[u8]> {
        Ok(&self.data)
    }
}

/// Detector reply
#[derive(Deserialize, Debug, Default)]
struct DetectorReply {
    #[serde(default)]
    hands: Vec<LandmarkSet>,
    #[serde(default)]
    faces: Vec<LandmarkSet>,
    #[serde(default)]
    error: Option<String>,
}

/// Send one frame and read one reply over an established channel
pub fn exchange<F, W, R>(writer: &mut W, reader: &mut R, frame: &F) -> Result<Detection>
where
    F: RawFrame + ?Sized,
    W: Write,
    R: BufRead,
{
    let (width, height) = frame.dimensions();
    let channels = frame.channels();
    let data = frame.pixel_bytes()?;

    let expected = width as usize * height as usize * channels as usize;
    if data.len() != expected {
        return Err(AppError::InvalidInput(format!(
            "Frame has {} bytes, expected {expected} for {width}x{height}x{channels}",
            data.len()
        )));
    }

    writer.write_all(&width.to_le_bytes())?;
    writer.write_all(&height.to_le_bytes())?;
    writer.write_all(&channels.to_le_bytes())?;
    writer.write_all(data)?;
    writer.flush()?;

    let mut response = String::new();
    if reader.read_line(&mut response)? == 0 {
        return Err(AppError::Bridge("Detector closed its output".to_string()));
    }

    let reply: DetectorReply = serde_json::from_str(response.trim())?;
    if let Some(error) = reply.error {
        warn!("Detector error: {}", error);
        return Ok(Detection::empty());
    }

    debug!("detector: {} hand(s), {} face(s)", reply.hands.len(), reply.faces.len());
    Ok(Detection {
        hands: reply.hands,
        faces: reply.faces,
    })
}

/// Wait for the detector's `READY` line
pub fn await_ready<R: BufRead>(reader: &mut R) -> Result<()> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim() == "READY" {
        Ok(())
    } else {
        Err(AppError::Bridge(format!(
            "Detector did not signal ready, got: {:?}",
            line.trim()
        )))
    }
}

/// Estimator backed by a child process
pub struct ProcessEstimator {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessEstimator {
    /// Start `command` (program followed by whitespace-separated arguments)
    pub fn spawn(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AppError::Bridge("Empty detector command".to_string()))?;

        info!("Starting landmark detector: {}", command);

        let mut process = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AppError::Bridge(format!("Failed to start {program}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| AppError::Bridge("Failed to get detector stdin".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| AppError::Bridge("Failed to get detector stdout".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        await_ready(&mut stdout)?;
        info!("Landmark detector ready");

        Ok(Self { process, stdin, stdout })
    }
}

impl<F: RawFrame> LandmarkEstimator<F> for ProcessEstimator {
    fn detect(&mut self, frame: &F) -> Result<Detection> {
        exchange(&mut self.stdin, &mut self.stdout, frame)
    }
}

impl Drop for ProcessEstimator {
    fn drop(&mut self) {
        if let Err(e) = self.process.kill() {
            debug!("Detector already stopped: {}", e);
        }
        let _ = self.process.wait();
    }
}
