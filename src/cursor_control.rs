//! Pointer and button injection for X11-based systems.
//!
//! Absolute pointer moves use a core-protocol pointer warp; button presses,
//! releases and wheel steps are synthesised through the XTEST extension.

use crate::{
    error::{AppError, Result},
    input::InputController,
    utils::safe_cast::i32_to_i16_clamp,
};
use log::{debug, info};
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{ConnectionExt, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
        xtest::ConnectionExt as XTestExt,
    },
    rust_connection::RustConnection,
    CURRENT_TIME,
};

/// Primary (left) button
const BUTTON_PRIMARY: u8 = 1;
/// Wheel up
const BUTTON_WHEEL_UP: u8 = 4;
/// Wheel down
const BUTTON_WHEEL_DOWN: u8 = 5;

/// X11 input controller
pub struct X11Input {
    connection: RustConnection,
    screen: Screen,
    screen_width: u16,
    screen_height: u16,
}

impl X11Input {
    /// Connect to the display named by `$DISPLAY` and check for XTEST
    pub fn new() -> Result<Self> {
        info!("Initializing X11 input controller");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| AppError::CursorControl(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| AppError::CursorControl("Failed to get screen".to_string()))?
            .clone();

        let version = connection
            .xtest_get_version(2, 2)
            .map_err(|e| AppError::CursorControl(format!("XTEST not available: {e}")))?
            .reply()
            .map_err(|e| AppError::CursorControl(format!("XTEST not available: {e}")))?;

        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        info!(
            "Connected to X11 display, screen: {}x{}, XTEST {}.{}",
            screen_width, screen_height, version.major_version, version.minor_version
        );

        Ok(Self {
            connection,
            screen,
            screen_width,
            screen_height,
        })
    }

    fn fake_button(&self, event: u8, button: u8) -> Result<()> {
        self.connection
            .xtest_fake_input(event, button, CURRENT_TIME, self.screen.root, 0, 0, 0)
            .map_err(|e| AppError::CursorControl(format!("Failed to inject button {button}: {e}")))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.connection
            .flush()
            .map_err(|e| AppError::CursorControl(format!("Failed to flush connection: {e}")))
    }
}

impl InputController for X11Input {
    fn screen_size(&self) -> (u32, u32) {
        (u32::from(self.screen_width), u32::from(self.screen_height))
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let (max_x, max_y) = clamp_bounds(self.screen_width, self.screen_height);
        let x = i32_to_i16_clamp(x).clamp(0, max_x);
        let y = i32_to_i16_clamp(y).clamp(0, max_y);

        debug!("Setting cursor position to ({}, {})", x, y);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| AppError::CursorControl(format!("Failed to warp pointer: {e}")))?;

        self.flush()
    }

    fn mouse_down(&mut self) -> Result<()> {
        self.fake_button(BUTTON_PRESS_EVENT, BUTTON_PRIMARY)?;
        self.flush()
    }

    fn mouse_up(&mut self) -> Result<()> {
        self.fake_button(BUTTON_RELEASE_EVENT, BUTTON_PRIMARY)?;
        self.flush()
    }

    fn click(&mut self) -> Result<()> {
        self.fake_button(BUTTON_PRESS_EVENT, BUTTON_PRIMARY)?;
        self.fake_button(BUTTON_RELEASE_EVENT, BUTTON_PRIMARY)?;
        self.flush()
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        let (button, steps) = wheel_steps(delta);
        for _ in 0..steps {
            self.fake_button(BUTTON_PRESS_EVENT, button)?;
            self.fake_button(BUTTON_RELEASE_EVENT, button)?;
        }
        self.flush()
    }
}

/// Largest valid pointer coordinates for a screen
fn clamp_bounds(width: u16, height: u16) -> (i16, i16) {
    let max_x = i16::try_from(width.saturating_sub(1)).unwrap_or(i16::MAX);
    let max_y = i16::try_from(height.saturating_sub(1)).unwrap_or(i16::MAX);
    (max_x, max_y)
}

/// Wheel button and click count for a scroll delta; positive scrolls up
fn wheel_steps(delta: i32) -> (u8, u32) {
    if delta >= 0 {
        (BUTTON_WHEEL_UP, delta.unsigned_abs())
    } else {
        (BUTTON_WHEEL_DOWN, delta.unsigned_abs())
    }
}
