//! `OpenCV` backends: camera/video-file frames, image and video files, and
//! the highgui preview window.

use crate::{
    bridge::RawFrame,
    error::{AppError, Result},
    media::{DisplayControl, DisplaySink, Frame, FrameSource, MediaSink, Overlay},
    utils::safe_cast::{f64_to_i32_trunc, i32_to_u32},
};
use log::{debug, info, warn};
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vector},
    highgui::{self, WINDOW_NORMAL},
    imgcodecs,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter, CAP_PROP_BUFFERSIZE},
};
use std::path::Path;

const WINDOW_NAME: &str = "Gesture Control";

impl Frame for Mat {
    fn dimensions(&self) -> (u32, u32) {
        (
            i32_to_u32(self.cols()).unwrap_or(0),
            i32_to_u32(self.rows()).unwrap_or(0),
        )
    }
}

impl RawFrame for Mat {
    fn channels(&self) -> u32 {
        i32_to_u32(MatTraitConst::channels(self)).unwrap_or(0)
    }

    fn pixel_bytes(&self) -> Result<&[u8]> {
        Ok(self.data_bytes()?)
    }
}

/// Where camera frames come from
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Frame source over an `OpenCV` capture device or file
pub struct CameraSource {
    capture: VideoCapture,
    mirror: bool,
}

impl CameraSource {
    /// Open `source`; `mirror` flips every frame horizontally
    pub fn open(source: &VideoSource, mirror: bool) -> Result<Self> {
        let capture = match source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // Reduce buffer size for lower latency (webcam only)
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !capture.is_opened()? {
            return Err(AppError::Media(format!("Failed to open {source:?}")));
        }

        Ok(Self { capture, mirror })
    }
}

impl FrameSource for CameraSource {
    type Frame = Mat;

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            info!("No more frames from capture");
            return Ok(None);
        }

        if self.mirror {
            let temp = frame.clone();
            core::flip(&temp, &mut frame, 1)?;
        }

        Ok(Some(frame))
    }
}

/// Writes photos with `imwrite` and videos with `VideoWriter`
#[derive(Debug, Clone)]
pub struct OpenCvMedia {
    fourcc: String,
}

impl OpenCvMedia {
    /// `fourcc` is the four-character video codec code, e.g. `XVID`
    #[must_use]
    pub fn new(fourcc: impl Into<String>) -> Self {
        Self { fourcc: fourcc.into() }
    }

    fn fourcc_code(&self) -> Result<i32> {
        let chars: Vec<char> = self.fourcc.chars().collect();
        match chars.as_slice() {
            [a, b, c, d] => Ok(VideoWriter::fourcc(*a, *b, *c, *d)?),
            _ => Err(AppError::Media(format!("Invalid fourcc {:?}", self.fourcc))),
        }
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| AppError::Media(format!("Path is not valid UTF-8: {}", path.display())))
}

impl MediaSink<Mat> for OpenCvMedia {
    type Video = VideoWriter;

    fn save_image(&mut self, path: &Path, frame: &Mat) -> Result<()> {
        if !imgcodecs::imwrite(path_str(path)?, frame, &Vector::new())? {
            return Err(AppError::Media(format!("Failed to write {}", path.display())));
        }
        info!("Saved {}", path.display());
        Ok(())
    }

    fn open_video(&mut self, path: &Path, fps: f64, size: (u32, u32)) -> Result<VideoWriter> {
        let width = i32::try_from(size.0).map_err(|_| AppError::Media("Frame too wide".to_string()))?;
        let height = i32::try_from(size.1).map_err(|_| AppError::Media("Frame too tall".to_string()))?;

        let writer = VideoWriter::new(path_str(path)?, self.fourcc_code()?, fps, Size::new(width, height), true)?;
        if !writer.is_opened()? {
            return Err(AppError::Media(format!("Failed to open video {}", path.display())));
        }
        info!("Recording to {} ({}x{} @ {} fps)", path.display(), width, height, fps);
        Ok(writer)
    }

    fn write_frame(&mut self, video: &mut VideoWriter, frame: &Mat) -> Result<()> {
        video.write(frame)?;
        Ok(())
    }

    fn close_video(&mut self, mut video: VideoWriter) -> Result<()> {
        video.release()?;
        debug!("Video writer released");
        Ok(())
    }
}

/// Preview window with the overlay drawn on a copy of the frame
pub struct HighGuiDisplay {
    window: String,
}

impl HighGuiDisplay {
    pub fn new() -> Result<Self> {
        highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        Ok(Self {
            window: WINDOW_NAME.to_string(),
        })
    }

    fn draw(&self, frame: &mut Mat, overlay: &Overlay) -> Result<()> {
        let (width, height) = Frame::dimensions(frame);

        for (row, label) in (0..).zip(&overlay.labels) {
            imgproc::put_text(
                frame,
                label,
                Point::new(10, 30 + 30 * row),
                FONT_HERSHEY_SIMPLEX,
                0.8,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                false,
            )?;
        }

        if let Some((ear, closed)) = overlay.eye {
            let color = if closed {
                Scalar::new(0.0, 0.0, 255.0, 0.0)
            } else {
                Scalar::new(0.0, 255.0, 0.0, 0.0)
            };
            imgproc::put_text(
                frame,
                &format!("EAR: {ear:.2}"),
                Point::new(10, f64_to_i32_trunc(f64::from(height)) - 20),
                FONT_HERSHEY_SIMPLEX,
                0.7,
                color,
                2,
                LINE_8,
                false,
            )?;
        }

        if let Some(pointer) = overlay.pointer {
            imgproc::circle(
                frame,
                Point::new(
                    f64_to_i32_trunc(pointer.x * f64::from(width)),
                    f64_to_i32_trunc(pointer.y * f64::from(height)),
                ),
                8,
                Scalar::new(255.0, 0.0, 255.0, 0.0),
                -1,
                LINE_8,
                0,
            )?;
        }

        if overlay.recording {
            imgproc::circle(
                frame,
                Point::new(f64_to_i32_trunc(f64::from(width)) - 30, 30),
                10,
                Scalar::new(0.0, 0.0, 255.0, 0.0),
                -1,
                LINE_8,
                0,
            )?;
        }

        Ok(())
    }
}

impl DisplaySink<Mat> for HighGuiDisplay {
    fn show(&mut self, frame: &Mat, overlay: &Overlay) -> Result<DisplayControl> {
        let mut display_frame = frame.clone();
        if let Err(e) = self.draw(&mut display_frame, overlay) {
            warn!("Failed to draw overlay: {}", e);
        }
        highgui::imshow(&self.window, &display_frame)?;

        let key = highgui::wait_key(1)?;
        if key == 27 || key == i32::from(b'q') {
            info!("Exit requested by user");
            return Ok(DisplayControl::Quit);
        }
        Ok(DisplayControl::Continue)
    }
}

impl Drop for HighGuiDisplay {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.window) {
            debug!("Failed to destroy window: {}", e);
        }
    }
}
