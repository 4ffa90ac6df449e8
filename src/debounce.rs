//! Debounce and cooldown control.
//!
//! A [`Debouncer`] turns a per-frame boolean into at most one event per
//! qualifying occurrence. Two disciplines are supported:
//!
//! - [`Discipline::OnSet`]: fires on a frame where the condition holds (after
//!   `min_frames` consecutive true frames) and the cooldown has elapsed. A
//!   condition held continuously therefore fires once per cooldown window.
//! - [`Discipline::OnRelease`]: waits for the condition to drop back to false
//!   after at least `min_frames` consecutive true frames, then fires once if
//!   the cooldown has elapsed.
//!
//! Both reset the consecutive-frame counter on every false frame, and both
//! stamp the cooldown before reporting the event.

use std::time::Duration;

/// Minimum interval between two firings of one gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownTimer {
    min_interval: Duration,
    last_fired: Option<Duration>,
}

impl CooldownTimer {
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fired: None,
        }
    }

    /// Whether `now - last_fired >= min_interval`; always true before the
    /// first firing
    #[must_use]
    pub fn ready(&self, now: Duration) -> bool {
        self.last_fired
            .map_or(true, |last| now.saturating_sub(last) >= self.min_interval)
    }

    /// Stamp a firing at `now`
    pub fn record(&mut self, now: Duration) {
        self.last_fired = Some(now);
    }

    /// Fire if ready, stamping the timer
    pub fn try_fire(&mut self, now: Duration) -> bool {
        if self.ready(now) {
            self.record(now);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn last_fired(&self) -> Option<Duration> {
        self.last_fired
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

/// When a debounced gesture fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// On a true frame, once the cooldown allows
    OnSet,
    /// On the true-to-false transition
    OnRelease,
}

/// Per-gesture consecutive-frame counter plus cooldown
#[derive(Debug, Clone)]
pub struct Debouncer {
    discipline: Discipline,
    min_frames: u32,
    consecutive: u32,
    cooldown: CooldownTimer,
}

impl Debouncer {
    /// Create a debouncer
    ///
    /// `min_frames` of zero is treated as one.
    #[must_use]
    pub fn new(discipline: Discipline, min_frames: u32, cooldown: Duration) -> Self {
        Self {
            discipline,
            min_frames: min_frames.max(1),
            consecutive: 0,
            cooldown: CooldownTimer::new(cooldown),
        }
    }

    /// Fire on the first qualifying true frame, rate limited by `cooldown`
    #[must_use]
    pub fn on_set(cooldown: Duration) -> Self {
        Self::new(Discipline::OnSet, 1, cooldown)
    }

    /// Fire on release after `min_frames` true frames, rate limited by `cooldown`
    #[must_use]
    pub fn on_release(min_frames: u32, cooldown: Duration) -> Self {
        Self::new(Discipline::OnRelease, min_frames, cooldown)
    }

    /// Feed one frame's condition; returns true when the event fires
    pub fn update(&mut self, active: bool, now: Duration) -> bool {
        match self.discipline {
            Discipline::OnSet => {
                if !active {
                    self.consecutive = 0;
                    return false;
                }
                self.consecutive = self.consecutive.saturating_add(1);
                self.consecutive >= self.min_frames && self.cooldown.try_fire(now)
            }
            Discipline::OnRelease => {
                if active {
                    self.consecutive = self.consecutive.saturating_add(1);
                    return false;
                }
                let held = self.consecutive;
                self.consecutive = 0;
                held >= self.min_frames && self.cooldown.try_fire(now)
            }
        }
    }

    /// Consecutive true frames seen so far
    #[must_use]
    pub const fn consecutive(&self) -> u32 {
        self.consecutive
    }

    #[must_use]
    pub const fn discipline(&self) -> Discipline {
        self.discipline
    }

    #[must_use]
    pub const fn cooldown(&self) -> &CooldownTimer {
        &self.cooldown
    }

    /// Clear the frame counter, keeping the cooldown
    pub fn reset_counter(&mut self) {
        self.consecutive = 0;
    }
}
