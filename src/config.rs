//! Configuration management for the gesture control application

use crate::{
    constants::*,
    dispatcher::Action,
    gestures::GestureKind,
    media::PhotoNaming,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hand gesture distances
    pub hand: HandConfig,

    /// Blink detection
    pub face: FaceConfig,

    /// Air-drawn V detection
    pub air_v: AirVConfig,

    /// Per-gesture cooldowns
    pub cooldowns: CooldownConfig,

    /// Velocity scroll
    pub scroll: ScrollConfig,

    /// Photo and video output
    pub recording: RecordingConfig,

    /// Which actions are live and what each gesture does
    pub actions: ActionConfig,
}

/// Hand gesture distances, in normalized image units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Index-thumb distance below which a tap is seen
    pub tap_distance: f64,

    /// Index-thumb distance below which a drag starts
    pub pinch_distance: f64,

    /// Index-thumb distance at or above which a drag ends
    pub drag_release_distance: f64,

    /// Index-middle distance below which scrolling engages
    pub scroll_distance: f64,
}

/// Blink detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Smoothed eye-aspect-ratio below which the eyes count as closed
    pub ear_threshold: f64,

    /// Number of samples averaged by the eye-aspect-ratio smoother
    pub ear_window: usize,

    /// Consecutive closed frames needed before a blink can fire
    pub blink_min_frames: u32,
}

/// Air-drawn V parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirVConfig {
    /// Fingertip positions kept in the trajectory
    pub capacity: usize,

    /// Positions needed before the shape test runs
    pub min_points: usize,

    /// Downward travel each half must exceed, in pixels
    pub vertical_margin_px: f64,

    /// Sideways travel each half must exceed, in pixels
    pub horizontal_margin_px: f64,

    /// Seconds without a hand after which the trajectory starts over
    pub max_gap_secs: f64,
}

/// Cooldowns in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub tap_secs: f64,
    pub blink_secs: f64,
    pub fist_secs: f64,
}

/// Velocity scroll parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll units per normalized-height-per-second
    pub sensitivity: f64,

    /// Clamp applied to each scroll command
    pub max_per_frame: i32,
}

/// Photo and video output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Video frame rate
    pub fps: f64,

    /// Four-character video codec code
    pub fourcc: String,

    /// Directory photos and videos are written to
    pub output_dir: PathBuf,

    /// Photo file numbering
    pub photo_naming: PhotoNaming,
}

/// Enabled continuous controls and the gesture to action table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Move the pointer with the index fingertip every frame
    pub pointer: bool,

    /// Hold the primary button while pinching
    pub drag: bool,

    /// Scroll with index and middle held together
    pub scroll: bool,

    /// Action fired by each edge-triggered gesture
    pub bindings: BTreeMap<GestureKind, Action>,
}

/// Preset matching one way of using the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Pointer, tap-click, drag and scroll
    Mouse,
    /// Blink or fist photo, V-sign recording, palm stop, thumbs-down exit
    Camera,
    /// Air-drawn V recording, fist photo, palm stop, thumbs-down exit
    Air,
    /// Everything at once
    All,
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mouse" => Ok(Self::Mouse),
            "camera" | "cam" => Ok(Self::Camera),
            "air" | "airdraw" => Ok(Self::Air),
            "all" => Ok(Self::All),
            other => Err(Error::ConfigError(format!("Unknown profile: {other}"))),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mouse => "mouse",
            Self::Camera => "camera",
            Self::Air => "air",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Camera)
    }
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            tap_distance: DEFAULT_TAP_DISTANCE,
            pinch_distance: DEFAULT_PINCH_DISTANCE,
            drag_release_distance: DEFAULT_PINCH_DISTANCE,
            scroll_distance: DEFAULT_SCROLL_DISTANCE,
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            ear_window: DEFAULT_EAR_WINDOW,
            blink_min_frames: DEFAULT_BLINK_MIN_FRAMES,
        }
    }
}

impl Default for AirVConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TRAJECTORY_CAPACITY,
            min_points: DEFAULT_TRAJECTORY_MIN_POINTS,
            vertical_margin_px: DEFAULT_V_VERTICAL_MARGIN_PX,
            horizontal_margin_px: DEFAULT_V_HORIZONTAL_MARGIN_PX,
            max_gap_secs: DEFAULT_TRAJECTORY_MAX_GAP,
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            tap_secs: DEFAULT_TAP_COOLDOWN,
            blink_secs: DEFAULT_BLINK_COOLDOWN,
            fist_secs: DEFAULT_FIST_COOLDOWN,
        }
    }
}

impl AirVConfig {
    /// Longest pause between hand samples that keeps one trajectory
    pub fn max_gap(&self) -> Result<Duration> {
        secs_to_duration("Trajectory gap", self.max_gap_secs)
    }
}

impl CooldownConfig {
    /// Cooldown applying to an edge-triggered gesture
    pub fn for_gesture(&self, kind: GestureKind) -> Result<Duration> {
        match kind {
            GestureKind::Tap => secs_to_duration("Tap cooldown", self.tap_secs),
            GestureKind::Blink => secs_to_duration("Blink cooldown", self.blink_secs),
            GestureKind::ClosedFist => secs_to_duration("Fist cooldown", self.fist_secs),
            _ => Ok(Duration::ZERO),
        }
    }
}

fn secs_to_duration(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::ConfigError(format!("{name} must be a representable number of seconds, got {secs}")))
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SCROLL_SENSITIVITY,
            max_per_frame: DEFAULT_MAX_SCROLL_PER_FRAME,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_RECORDING_FPS,
            fourcc: DEFAULT_FOURCC.to_string(),
            output_dir: PathBuf::from("."),
            photo_naming: PhotoNaming::Counter,
        }
    }
}

impl ActionConfig {
    /// Continuous controls and bindings for a profile
    #[must_use]
    pub fn for_profile(profile: Profile) -> Self {
        let mut bindings = BTreeMap::new();
        let (pointer, drag, scroll) = match profile {
            Profile::Mouse => {
                bindings.insert(GestureKind::Tap, Action::Click);
                (true, true, true)
            }
            Profile::Camera => {
                bindings.insert(GestureKind::Blink, Action::CapturePhoto);
                bindings.insert(GestureKind::ClosedFist, Action::CapturePhoto);
                bindings.insert(GestureKind::VSign, Action::StartRecording);
                bindings.insert(GestureKind::OpenPalm, Action::StopRecording);
                bindings.insert(GestureKind::ThumbsDown, Action::Exit);
                (false, false, false)
            }
            Profile::Air => {
                bindings.insert(GestureKind::AirV, Action::StartRecording);
                bindings.insert(GestureKind::ClosedFist, Action::CapturePhoto);
                bindings.insert(GestureKind::OpenPalm, Action::StopRecording);
                bindings.insert(GestureKind::ThumbsDown, Action::Exit);
                (false, false, false)
            }
            Profile::All => {
                let mut all = Self::for_profile(Profile::Camera).bindings;
                all.extend(Self::for_profile(Profile::Air).bindings);
                all.extend(Self::for_profile(Profile::Mouse).bindings);
                bindings = all;
                (true, true, true)
            }
        };

        Self {
            pointer,
            drag,
            scroll,
            bindings,
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Camera)
    }
}

impl Config {
    /// Default thresholds with the controls and bindings of `profile`
    #[must_use]
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            hand: HandConfig::default(),
            face: FaceConfig::default(),
            air_v: AirVConfig::default(),
            cooldowns: CooldownConfig::default(),
            scroll: ScrollConfig::default(),
            recording: RecordingConfig {
                photo_naming: match profile {
                    Profile::Air => PhotoNaming::UnixTime,
                    _ => PhotoNaming::Counter,
                },
                ..RecordingConfig::default()
            },
            actions: ActionConfig::for_profile(profile),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serialize configuration to YAML text
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate distances
        for (name, value) in [
            ("Tap distance", self.hand.tap_distance),
            ("Pinch distance", self.hand.pinch_distance),
            ("Drag release distance", self.hand.drag_release_distance),
            ("Scroll distance", self.hand.scroll_distance),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::ConfigError(format!("{name} must be in (0, 1], got {value}")));
            }
        }
        if self.hand.drag_release_distance < self.hand.pinch_distance {
            return Err(Error::ConfigError(
                "Drag release distance must not be below the pinch distance".to_string(),
            ));
        }

        // Validate blink settings
        if !(self.face.ear_threshold > 0.0) {
            return Err(Error::ConfigError("EAR threshold must be positive".to_string()));
        }
        if self.face.ear_window == 0 {
            return Err(Error::ConfigError("EAR window size must be greater than 0".to_string()));
        }
        if self.face.blink_min_frames == 0 {
            return Err(Error::ConfigError("Blink minimum frames must be greater than 0".to_string()));
        }

        // Validate trajectory
        if self.air_v.capacity < 2 {
            return Err(Error::ConfigError("Trajectory capacity must be at least 2".to_string()));
        }
        if self.air_v.min_points < 2 || self.air_v.min_points > self.air_v.capacity {
            return Err(Error::ConfigError(
                "Trajectory minimum points must be between 2 and the capacity".to_string(),
            ));
        }
        if !(self.air_v.vertical_margin_px >= 0.0 && self.air_v.horizontal_margin_px >= 0.0) {
            return Err(Error::ConfigError("V margins must not be negative".to_string()));
        }
        if !(self.air_v.max_gap_secs > 0.0) {
            return Err(Error::ConfigError("Trajectory gap must be positive".to_string()));
        }
        self.air_v.max_gap()?;

        // Validate timing
        for kind in [GestureKind::Tap, GestureKind::Blink, GestureKind::ClosedFist] {
            self.cooldowns.for_gesture(kind)?;
        }

        // Validate scroll
        if !(self.scroll.sensitivity > 0.0) {
            return Err(Error::ConfigError("Scroll sensitivity must be positive".to_string()));
        }
        if self.scroll.max_per_frame <= 0 {
            return Err(Error::ConfigError("Scroll clamp must be greater than 0".to_string()));
        }

        // Validate recording
        if !(self.recording.fps > 0.0) {
            return Err(Error::ConfigError("Recording FPS must be greater than 0".to_string()));
        }
        if self.recording.fourcc.chars().count() != 4 {
            return Err(Error::ConfigError(format!(
                "Video codec must be four characters, got {:?}",
                self.recording.fourcc
            )));
        }

        // Level-triggered gestures are controlled by the enable flags
        for kind in [GestureKind::Pinch, GestureKind::ScrollEngage] {
            if self.actions.bindings.contains_key(&kind) {
                return Err(Error::ConfigError(format!(
                    "{kind} is level-triggered and cannot be bound to an action"
                )));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gesture Control Configuration

# Hand gesture distances (normalized image units)
hand:
  tap_distance: 0.05
  pinch_distance: 0.035
  drag_release_distance: 0.035
  scroll_distance: 0.06

# Blink detection
face:
  ear_threshold: 0.25
  ear_window: 5
  blink_min_frames: 3

# Air-drawn V detection
air_v:
  capacity: 20
  min_points: 10
  vertical_margin_px: 20.0
  horizontal_margin_px: 10.0
  max_gap_secs: 0.5

# Cooldowns (seconds)
cooldowns:
  tap_secs: 0.25
  blink_secs: 1.5
  fist_secs: 1.5

# Velocity scroll
scroll:
  sensitivity: 250.0
  max_per_frame: 5

# Photo and video output
recording:
  fps: 20.0
  fourcc: "XVID"
  output_dir: "."
  photo_naming: counter

# Continuous controls and gesture bindings
actions:
  pointer: false
  drag: false
  scroll: false
  bindings:
    blink: capture_photo
    closed_fist: capture_photo
    v_sign: start_recording
    open_palm: stop_recording
    thumbs_down: exit
"#;
