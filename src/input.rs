//! Pointer and button commands issued by the dispatcher.
//!
//! [`InputController`] is implemented by the X11 backend in
//! [`crate::cursor_control`] and by [`RecordedInput`], which only logs and
//! records what it was asked to do (dry runs and tests).

use crate::Result;
use log::debug;

/// OS-level pointer control
pub trait InputController {
    /// Screen size in pixels, queried once at session start
    fn screen_size(&self) -> (u32, u32);

    /// Move the pointer to an absolute screen position
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press the primary button
    fn mouse_down(&mut self) -> Result<()>;

    /// Release the primary button
    fn mouse_up(&mut self) -> Result<()>;

    /// Press and release the primary button
    fn click(&mut self) -> Result<()>;

    /// Scroll by `delta` wheel units, positive scrolls up
    fn scroll(&mut self, delta: i32) -> Result<()>;
}

/// A command received by [`RecordedInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    MoveTo { x: i32, y: i32 },
    MouseDown,
    MouseUp,
    Click,
    Scroll(i32),
}

/// Input controller that records commands instead of injecting them
#[derive(Debug, Clone)]
pub struct RecordedInput {
    screen: (u32, u32),
    commands: Vec<InputCommand>,
}

impl RecordedInput {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen: (width, height),
            commands: Vec::new(),
        }
    }

    /// Everything issued so far, oldest first
    #[must_use]
    pub fn commands(&self) -> &[InputCommand] {
        &self.commands
    }

    /// Recorded commands other than pointer moves
    #[must_use]
    pub fn actions(&self) -> Vec<InputCommand> {
        self.commands
            .iter()
            .filter(|c| !matches!(c, InputCommand::MoveTo { .. }))
            .copied()
            .collect()
    }

    /// Number of recorded commands equal to `command`
    #[must_use]
    pub fn count(&self, command: InputCommand) -> usize {
        self.commands.iter().filter(|c| **c == command).count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, command: InputCommand) {
        debug!("input: {:?}", command);
        self.commands.push(command);
    }
}

impl Default for RecordedInput {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl InputController for RecordedInput {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(InputCommand::MoveTo { x, y });
        Ok(())
    }

    fn mouse_down(&mut self) -> Result<()> {
        self.record(InputCommand::MouseDown);
        Ok(())
    }

    fn mouse_up(&mut self) -> Result<()> {
        self.record(InputCommand::MouseUp);
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        self.record(InputCommand::Click);
        Ok(())
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        self.record(InputCommand::Scroll(delta));
        Ok(())
    }
}

impl<T: InputController + ?Sized> InputController for Box<T> {
    fn screen_size(&self) -> (u32, u32) {
        (**self).screen_size()
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).move_to(x, y)
    }

    fn mouse_down(&mut self) -> Result<()> {
        (**self).mouse_down()
    }

    fn mouse_up(&mut self) -> Result<()> {
        (**self).mouse_up()
    }

    fn click(&mut self) -> Result<()> {
        (**self).click()
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        (**self).scroll(delta)
    }
}
