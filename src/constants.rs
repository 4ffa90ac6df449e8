//! Constants used throughout the application

/// Number of landmarks in a hand set
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Minimum number of landmarks in a face mesh set
pub const MIN_FACE_LANDMARKS: usize = 468;

/// Eye contour indices in face-mesh order: outer corner, two upper lid
/// points, inner corner, two lower lid points
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Default gesture distances (normalized image units)
pub const DEFAULT_TAP_DISTANCE: f64 = 0.05;
pub const DEFAULT_PINCH_DISTANCE: f64 = 0.035;
pub const DEFAULT_SCROLL_DISTANCE: f64 = 0.06;

/// Default eye-aspect-ratio settings
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;
pub const DEFAULT_EAR_WINDOW: usize = 5;
pub const DEFAULT_BLINK_MIN_FRAMES: u32 = 3;

/// Default air-drawn V settings
pub const DEFAULT_TRAJECTORY_CAPACITY: usize = 20;
pub const DEFAULT_TRAJECTORY_MIN_POINTS: usize = 10;
pub const DEFAULT_V_VERTICAL_MARGIN_PX: f64 = 20.0;
pub const DEFAULT_V_HORIZONTAL_MARGIN_PX: f64 = 10.0;
pub const DEFAULT_TRAJECTORY_MAX_GAP: f64 = 0.5;

/// Default cooldowns in seconds
pub const DEFAULT_TAP_COOLDOWN: f64 = 0.25;
pub const DEFAULT_BLINK_COOLDOWN: f64 = 1.5;
pub const DEFAULT_FIST_COOLDOWN: f64 = 1.5;

/// Default scroll velocity scaling and clamp
pub const DEFAULT_SCROLL_SENSITIVITY: f64 = 250.0;
pub const DEFAULT_MAX_SCROLL_PER_FRAME: i32 = 5;

/// Default recording parameters
pub const DEFAULT_RECORDING_FPS: f64 = 20.0;
pub const DEFAULT_FOURCC: &str = "XVID";

/// Frame size assumed when a frame source cannot report one
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
