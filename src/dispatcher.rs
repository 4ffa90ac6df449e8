//! Action dispatch and cross-frame continuous state.
//!
//! Edge-triggered gestures arrive as [`GestureEvent`]s and are mapped to an
//! [`Action`] through the binding table. Level-triggered controls (drag,
//! scroll, recording) are tracked in [`ContinuousState`] and only change on
//! confirmed transitions; every resource they hold is released exactly once.

use crate::{
    config::{ActionConfig, RecordingConfig, ScrollConfig},
    features::FeatureSnapshot,
    gestures::GestureKind,
    input::InputController,
    landmarks::Point,
    media::{photo_label, video_label, CaptureNamer, Frame, MediaSink},
    utils::f64_to_i32_trunc,
    Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::PathBuf, time::Duration};

/// What an edge-triggered gesture does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Click the primary button
    Click,
    /// Save the current frame as a photo
    CapturePhoto,
    /// Open a video stream if none is open
    StartRecording,
    /// Close the open video stream
    StopRecording,
    /// Release everything and stop the loop
    Exit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Click => "click",
            Self::CapturePhoto => "capture_photo",
            Self::StartRecording => "start_recording",
            Self::StopRecording => "stop_recording",
            Self::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// A debounced gesture occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub timestamp: Duration,
    /// Features of the frame that fired it
    pub features: FeatureSnapshot,
}

/// State that lives across frames
#[derive(Debug)]
pub struct ContinuousState<V> {
    pub drag_active: bool,
    pub scroll_active: bool,
    recording: Option<ActiveRecording<V>>,
}

/// An open video stream
#[derive(Debug)]
pub struct ActiveRecording<V> {
    pub path: PathBuf,
    pub frames: u64,
    video: V,
}

impl<V> ContinuousState<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drag_active: false,
            scroll_active: false,
            recording: None,
        }
    }

    #[must_use]
    pub const fn recording_active(&self) -> bool {
        self.recording.is_some()
    }

    #[must_use]
    pub fn recording(&self) -> Option<&ActiveRecording<V>> {
        self.recording.as_ref()
    }
}

impl<V> Default for ContinuousState<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertical velocity of the index/middle midpoint turned into wheel units
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    sensitivity: f64,
    max_per_frame: i32,
    baseline: Option<(f64, Duration)>,
}

impl ScrollTracker {
    #[must_use]
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            max_per_frame: config.max_per_frame.max(0),
            baseline: None,
        }
    }

    /// Feed one frame; returns the clamped scroll delta, 0 when nothing
    /// should be issued
    ///
    /// Disengaging drops the baseline so the next engagement starts fresh.
    pub fn update(&mut self, engaged: bool, anchor_y: f64, now: Duration) -> i32 {
        if !engaged {
            self.baseline = None;
            return 0;
        }

        let delta = match self.baseline {
            Some((previous_y, previous_t)) => {
                let dt = now.saturating_sub(previous_t).as_secs_f64();
                if dt > 0.0 {
                    // Moving up (smaller y) scrolls up
                    let speed = (previous_y - anchor_y) / dt;
                    let limit = f64::from(self.max_per_frame);
                    f64_to_i32_trunc((speed * self.sensitivity).clamp(-limit, limit))
                } else {
                    0
                }
            }
            None => 0,
        };

        self.baseline = Some((anchor_y, now));
        delta
    }

    #[must_use]
    pub const fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn reset(&mut self) {
        self.baseline = None;
    }
}

/// Owns continuous state and turns gestures into external commands
#[derive(Debug)]
pub struct Dispatcher<V> {
    state: ContinuousState<V>,
    scroll: ScrollTracker,
    bindings: BTreeMap<GestureKind, Action>,
    namer: CaptureNamer,
    fps: f64,
    screen: (u32, u32),
}

impl<V> Dispatcher<V> {
    #[must_use]
    pub fn new(actions: &ActionConfig, scroll: &ScrollConfig, recording: &RecordingConfig, screen: (u32, u32)) -> Self {
        Self {
            state: ContinuousState::new(),
            scroll: ScrollTracker::new(scroll),
            bindings: actions.bindings.clone(),
            namer: CaptureNamer::new(recording.output_dir.clone(), recording.photo_naming),
            fps: recording.fps,
            screen,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ContinuousState<V> {
        &self.state
    }

    /// Action bound to `kind`, if any
    #[must_use]
    pub fn binding(&self, kind: GestureKind) -> Option<Action> {
        self.bindings.get(&kind).copied()
    }

    #[must_use]
    pub fn is_bound(&self, kind: GestureKind) -> bool {
        self.bindings.contains_key(&kind)
    }

    /// Map a normalized point to screen pixels
    #[must_use]
    pub fn to_screen(&self, point: Point) -> (i32, i32) {
        (
            f64_to_i32_trunc(point.x * f64::from(self.screen.0)),
            f64_to_i32_trunc(point.y * f64::from(self.screen.1)),
        )
    }

    /// Move the pointer 1:1 to the fingertip
    pub fn move_pointer<I: InputController + ?Sized>(&mut self, input: &mut I, tip: Point) -> Result<(i32, i32)> {
        let (x, y) = self.to_screen(tip);
        input.move_to(x, y)?;
        Ok((x, y))
    }

    /// Press on pinch, release when the pinch opens; returns the new drag state
    pub fn update_drag<I: InputController + ?Sized>(&mut self, input: &mut I, pinch: bool, hold: bool) -> Result<bool> {
        if pinch && !self.state.drag_active {
            input.mouse_down()?;
            self.state.drag_active = true;
            debug!("drag started");
        } else if !hold && self.state.drag_active {
            input.mouse_up()?;
            self.state.drag_active = false;
            debug!("drag ended");
        }
        Ok(self.state.drag_active)
    }

    /// Track scroll engagement and issue non-zero deltas
    pub fn update_scroll<I: InputController + ?Sized>(
        &mut self,
        input: &mut I,
        engaged: bool,
        anchor_y: f64,
        now: Duration,
    ) -> Result<i32> {
        self.state.scroll_active = engaged;
        let delta = self.scroll.update(engaged, anchor_y, now);
        if delta != 0 {
            input.scroll(delta)?;
        }
        Ok(delta)
    }

    /// Forget the scroll baseline without touching the engaged flag
    pub fn reset_scroll(&mut self) {
        self.scroll.reset();
    }

    /// Perform the action bound to `event`; returns what was actually done
    pub fn dispatch<F, I, M>(
        &mut self,
        event: &GestureEvent,
        frame: &F,
        input: &mut I,
        media: &mut M,
        unix_seconds: i64,
    ) -> Result<Option<Action>>
    where
        F: Frame,
        I: InputController + ?Sized,
        M: MediaSink<F, Video = V>,
    {
        let Some(action) = self.binding(event.kind) else {
            return Ok(None);
        };

        match action {
            Action::Click => {
                input.click()?;
                debug!("{} -> click", event.kind);
            }
            Action::CapturePhoto => {
                let path = self.namer.next_photo(&photo_label(event.kind), unix_seconds);
                media.save_image(&path, frame)?;
                info!("{} -> photo {}", event.kind, path.display());
            }
            Action::StartRecording => {
                if self.state.recording.is_some() {
                    return Ok(None);
                }
                let path = self.namer.video(&video_label(event.kind), unix_seconds);
                let video = media.open_video(&path, self.fps, frame.dimensions())?;
                info!("{} -> recording {}", event.kind, path.display());
                self.state.recording = Some(ActiveRecording { path, frames: 0, video });
            }
            Action::StopRecording => {
                if !self.stop_recording::<F, M>(media)? {
                    return Ok(None);
                }
                info!("{} -> recording stopped", event.kind);
            }
            Action::Exit => {
                info!("{} -> exit", event.kind);
            }
        }

        Ok(Some(action))
    }

    /// Close the open stream, if any; returns whether one was open
    ///
    /// The state is cleared even if the sink fails to close.
    pub fn stop_recording<F, M>(&mut self, media: &mut M) -> Result<bool>
    where
        M: MediaSink<F, Video = V>,
    {
        match self.state.recording.take() {
            Some(recording) => {
                debug!("closing {} after {} frames", recording.path.display(), recording.frames);
                media.close_video(recording.video)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append `frame` to the open stream, if any
    pub fn append_frame<F, M>(&mut self, frame: &F, media: &mut M) -> Result<()>
    where
        M: MediaSink<F, Video = V>,
    {
        if let Some(recording) = self.state.recording.as_mut() {
            media.write_frame(&mut recording.video, frame)?;
            recording.frames += 1;
        }
        Ok(())
    }

    /// Release the held button and close the open stream
    ///
    /// Safe to call repeatedly; failures are logged, not returned.
    pub fn release_all<F, I, M>(&mut self, input: &mut I, media: &mut M)
    where
        I: InputController + ?Sized,
        M: MediaSink<F, Video = V>,
    {
        if self.state.drag_active {
            self.state.drag_active = false;
            if let Err(e) = input.mouse_up() {
                warn!("Failed to release mouse button: {}", e);
            }
        }

        self.state.scroll_active = false;
        self.scroll.reset();

        if let Err(e) = self.stop_recording::<F, M>(media) {
            warn!("Failed to close video stream: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, Profile},
        input::{InputCommand, RecordedInput},
        media::{MediaCommand, RecordedMedia, RecordedVideo},
    };

    struct Blank;

    impl Frame for Blank {
        fn dimensions(&self) -> (u32, u32) {
            (640, 480)
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn dispatcher(profile: Profile) -> Dispatcher<RecordedVideo> {
        let config = Config::for_profile(profile);
        Dispatcher::new(&config.actions, &config.scroll, &config.recording, (1920, 1080))
    }

    fn event(kind: GestureKind) -> GestureEvent {
        GestureEvent {
            kind,
            timestamp: Duration::ZERO,
            features: FeatureSnapshot::empty(Duration::ZERO),
        }
    }

    #[test]
    fn test_scroll_first_sample_is_zero() {
        let mut tracker = ScrollTracker::new(&ScrollConfig::default());
        assert_eq!(tracker.update(true, 0.5, secs(0.0)), 0);
        assert!(tracker.has_baseline());
    }

    #[test]
    fn test_scroll_velocity_and_clamp() {
        let mut tracker = ScrollTracker::new(&ScrollConfig::default());
        tracker.update(true, 0.5, secs(0.0));
        // 0.001 up over 0.1 s -> 0.01/s * 250 = 2.5 -> 2
        assert_eq!(tracker.update(true, 0.499, secs(0.1)), 2);
        // Large downward jump clamps
        assert_eq!(tracker.update(true, 0.9, secs(0.2)), -5);
    }

    #[test]
    fn test_scroll_disengage_clears_baseline() {
        let mut tracker = ScrollTracker::new(&ScrollConfig::default());
        tracker.update(true, 0.5, secs(0.0));
        assert_eq!(tracker.update(false, 0.5, secs(0.1)), 0);
        assert!(!tracker.has_baseline());
        // Fresh engagement far away produces no delta
        assert_eq!(tracker.update(true, 0.1, secs(0.2)), 0);
    }

    #[test]
    fn test_scroll_zero_dt() {
        let mut tracker = ScrollTracker::new(&ScrollConfig::default());
        tracker.update(true, 0.5, secs(1.0));
        assert_eq!(tracker.update(true, 0.1, secs(1.0)), 0);
    }

    #[test]
    fn test_drag_transitions() {
        let mut dispatcher = dispatcher(Profile::Mouse);
        let mut input = RecordedInput::default();

        assert!(dispatcher.update_drag(&mut input, true, true).unwrap());
        assert!(dispatcher.update_drag(&mut input, true, true).unwrap());
        assert!(!dispatcher.update_drag(&mut input, false, false).unwrap());
        assert!(!dispatcher.update_drag(&mut input, false, false).unwrap());

        assert_eq!(input.actions(), vec![InputCommand::MouseDown, InputCommand::MouseUp]);
    }

    #[test]
    fn test_pointer_mapping() {
        let mut dispatcher = dispatcher(Profile::Mouse);
        let mut input = RecordedInput::default();
        let (x, y) = dispatcher.move_pointer(&mut input, Point::new(0.5, 0.25)).unwrap();
        assert_eq!((x, y), (960, 270));
        assert_eq!(input.commands(), &[InputCommand::MoveTo { x: 960, y: 270 }]);
    }

    #[test]
    fn test_recording_lifecycle() {
        let mut dispatcher = dispatcher(Profile::Camera);
        let mut input = RecordedInput::default();
        let mut media = RecordedMedia::new();
        let frame = Blank;

        let started = dispatcher
            .dispatch(&event(GestureKind::VSign), &frame, &mut input, &mut media, 42)
            .unwrap();
        assert_eq!(started, Some(Action::StartRecording));

        // No double open while active
        let again = dispatcher
            .dispatch(&event(GestureKind::VSign), &frame, &mut input, &mut media, 43)
            .unwrap();
        assert_eq!(again, None);

        dispatcher.append_frame(&frame, &mut media).unwrap();
        assert_eq!(dispatcher.state().recording().map(|r| r.frames), Some(1));

        let stopped = dispatcher
            .dispatch(&event(GestureKind::OpenPalm), &frame, &mut input, &mut media, 44)
            .unwrap();
        assert_eq!(stopped, Some(Action::StopRecording));
        assert!(!dispatcher.state().recording_active());

        // Palm with nothing open is a no-op
        let idle = dispatcher
            .dispatch(&event(GestureKind::OpenPalm), &frame, &mut input, &mut media, 45)
            .unwrap();
        assert_eq!(idle, None);

        assert_eq!(media.opened(), 1);
        assert_eq!(media.closed(), 1);
        assert!(matches!(
            &media.commands()[0],
            MediaCommand::OpenVideo { path, fps, size, .. }
                if path == &PathBuf::from("./video_42.avi") && *fps == 20.0 && *size == (640, 480)
        ));
    }

    #[test]
    fn test_unbound_gesture_does_nothing() {
        let mut dispatcher = dispatcher(Profile::Mouse);
        let mut input = RecordedInput::default();
        let mut media = RecordedMedia::new();
        let done = dispatcher
            .dispatch(&event(GestureKind::ClosedFist), &Blank, &mut input, &mut media, 0)
            .unwrap();
        assert_eq!(done, None);
        assert!(media.commands().is_empty());
    }

    #[test]
    fn test_release_all_is_idempotent() {
        let mut dispatcher = dispatcher(Profile::All);
        let mut input = RecordedInput::default();
        let mut media = RecordedMedia::new();

        dispatcher.update_drag(&mut input, true, true).unwrap();
        dispatcher
            .dispatch(&event(GestureKind::VSign), &Blank, &mut input, &mut media, 1)
            .unwrap();

        dispatcher.release_all::<Blank, _, _>(&mut input, &mut media);
        dispatcher.release_all::<Blank, _, _>(&mut input, &mut media);

        assert_eq!(input.count(InputCommand::MouseUp), 1);
        assert_eq!(media.closed(), 1);
        assert!(!dispatcher.state().drag_active);
    }
}
