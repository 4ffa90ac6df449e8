//! Gesture session: the per-frame pipeline and the frame loop.
//!
//! A [`GestureSession`] owns every piece of cross-frame state (smoothing
//! buffers, debouncers, the dispatcher's continuous state) together with the
//! input and media backends. [`GestureSession::process`] runs one frame
//! through extraction, classification, debouncing and dispatch;
//! [`GestureSession::run`] drives it from a frame source until the exit
//! gesture, end of stream, a quit request or an interrupt, and always
//! releases held buttons and open video streams on the way out.

use crate::{
    config::Config,
    debounce::Debouncer,
    dispatcher::{Action, ContinuousState, Dispatcher, GestureEvent},
    features::{self, FeatureSnapshot, FrameGeometry},
    gestures::{self, GestureKind},
    input::InputController,
    landmarks::Detection,
    media::{DisplayControl, DisplaySink, Frame, FrameSource, LandmarkEstimator, MediaSink, Overlay},
    smoothing::{SignalHistory, Trajectory},
    Result,
};
use log::{debug, info, warn};
use std::{
    collections::BTreeMap,
    fmt,
    marker::PhantomData,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Source of frame timestamps and wall-clock seconds for file names
pub trait Clock {
    /// Time since the session started
    fn elapsed(&self) -> Duration;

    /// Current Unix time in whole seconds
    fn unix_seconds(&self) -> i64;
}

/// Monotonic clock started at construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn unix_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
    unix_start: i64,
}

impl ManualClock {
    #[must_use]
    pub const fn new(unix_start: i64) -> Self {
        Self {
            now: Duration::ZERO,
            unix_start,
        }
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now
    }

    fn unix_seconds(&self) -> i64 {
        let secs = i64::try_from(self.now.as_secs()).unwrap_or(i64::MAX);
        self.unix_start.saturating_add(secs)
    }
}

/// Why the frame loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// An exit gesture fired (thumbs-down by default)
    ThumbsDown,
    /// The frame source ran out or could not be read
    EndOfStream,
    /// The display asked to quit
    QuitRequested,
    /// The stop flag was raised, e.g. by Ctrl-C
    Interrupted,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ThumbsDown => "exit gesture",
            Self::EndOfStream => "end of stream",
            Self::QuitRequested => "quit requested",
            Self::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_processed: u64,
    pub exit_reason: ExitReason,
}

/// What happened while processing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub snapshot: FeatureSnapshot,
    /// Debounced events in the order they were acted on
    pub events: Vec<GestureEvent>,
    /// Actions that actually took effect
    pub actions: Vec<Action>,
    /// Wheel units issued this frame
    pub scroll_delta: i32,
    /// The exit action fired; the session has already released everything
    pub exit: bool,
    pub overlay: Overlay,
}

impl FrameOutcome {
    fn new(snapshot: FeatureSnapshot) -> Self {
        Self {
            snapshot,
            events: Vec::new(),
            actions: Vec::new(),
            scroll_delta: 0,
            exit: false,
            overlay: Overlay::default(),
        }
    }

    /// Whether `kind` fired this frame
    #[must_use]
    pub fn fired(&self, kind: GestureKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }
}

/// Debouncer for every edge-triggered gesture
fn build_debouncers(config: &Config) -> Result<BTreeMap<GestureKind, Debouncer>> {
    GestureKind::PRIORITY
        .iter()
        .map(|&kind| {
            let cooldown = config.cooldowns.for_gesture(kind)?;
            let debouncer = match kind {
                GestureKind::Blink => Debouncer::on_release(config.face.blink_min_frames, cooldown),
                _ => Debouncer::on_set(cooldown),
            };
            Ok((kind, debouncer))
        })
        .collect()
}

/// All cross-frame state of one gesture-control session
pub struct GestureSession<F, I, M>
where
    I: InputController,
    M: MediaSink<F>,
{
    config: Config,
    dispatcher: Dispatcher<M::Video>,
    ear_history: SignalHistory<f64>,
    trajectory: Trajectory,
    trajectory_gap: Duration,
    last_hand_at: Option<Duration>,
    debouncers: BTreeMap<GestureKind, Debouncer>,
    input: I,
    media: M,
    stop: Arc<AtomicBool>,
    frames_processed: u64,
    _frame: PhantomData<fn(&F)>,
}

impl<F, I, M> GestureSession<F, I, M>
where
    F: Frame,
    I: InputController,
    M: MediaSink<F>,
{
    /// Create a session; the screen size is queried from `input` once here
    pub fn new(config: Config, input: I, media: M) -> Result<Self> {
        config.validate()?;

        let screen = input.screen_size();
        info!("Gesture session starting, screen: {}x{}", screen.0, screen.1);
        debug!(
            "bindings: {:?}, pointer: {}, drag: {}, scroll: {}",
            config.actions.bindings, config.actions.pointer, config.actions.drag, config.actions.scroll
        );

        Ok(Self {
            dispatcher: Dispatcher::new(&config.actions, &config.scroll, &config.recording, screen),
            ear_history: SignalHistory::new(config.face.ear_window),
            trajectory: Trajectory::new(config.air_v.capacity),
            trajectory_gap: config.air_v.max_gap()?,
            last_hand_at: None,
            debouncers: build_debouncers(&config)?,
            config,
            input,
            media,
            stop: Arc::new(AtomicBool::new(false)),
            frames_processed: 0,
            _frame: PhantomData,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &ContinuousState<M::Video> {
        self.dispatcher.state()
    }

    #[must_use]
    pub const fn input(&self) -> &I {
        &self.input
    }

    #[must_use]
    pub const fn media(&self) -> &M {
        &self.media
    }

    #[must_use]
    pub const fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Current smoothed eye-aspect-ratio, if any samples were seen
    #[must_use]
    pub fn smoothed_ear(&self) -> Option<f64> {
        self.ear_history.mean()
    }

    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Flag checked once per frame by [`Self::run`]; raising it stops the loop
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run one frame through the pipeline
    ///
    /// `now` is the frame time relative to the session start and
    /// `unix_seconds` names any video opened on this frame. Command failures
    /// are logged and skipped; they never abort the frame.
    pub fn process(&mut self, frame: &F, detection: &Detection, now: Duration, unix_seconds: i64) -> FrameOutcome {
        let (width, height) = frame.dimensions();
        let snapshot = features::extract(detection, FrameGeometry::new(width, height), now);
        let mut outcome = FrameOutcome::new(snapshot);
        self.frames_processed += 1;

        if self.config.actions.pointer {
            if let Some(hand) = &snapshot.hand {
                outcome.overlay.pointer = Some(hand.index_tip);
                if let Err(e) = self.dispatcher.move_pointer(&mut self.input, hand.index_tip) {
                    warn!("Failed to move pointer: {}", e);
                }
            }
        }

        let candidates = self.edge_candidates(&snapshot, now, &mut outcome.overlay);
        for kind in GestureKind::PRIORITY {
            let Some(active) = candidates.get(&kind).copied() else {
                continue;
            };
            let Some(debouncer) = self.debouncers.get_mut(&kind) else {
                continue;
            };
            if debouncer.update(active, now) {
                debug!("{} fired at {:?}", kind, now);
                outcome.events.push(GestureEvent {
                    kind,
                    timestamp: now,
                    features: snapshot,
                });
            }
        }

        for event in outcome.events.clone() {
            match self
                .dispatcher
                .dispatch(&event, frame, &mut self.input, &mut self.media, unix_seconds)
            {
                Ok(Some(action)) => {
                    outcome.actions.push(action);
                    if action == Action::Click {
                        outcome.overlay.labels.push("Tap!".to_string());
                    }
                    if action == Action::Exit {
                        outcome.exit = true;
                        self.shutdown();
                        return outcome;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to perform {} action: {}", event.kind, e),
            }
        }

        self.update_continuous(&snapshot, now, &mut outcome);

        if let Err(e) = self.dispatcher.append_frame(frame, &mut self.media) {
            warn!("Failed to append frame to recording: {}", e);
        }
        outcome.overlay.recording = self.dispatcher.state().recording_active();
        if outcome.overlay.recording {
            outcome.overlay.labels.push("REC".to_string());
        }

        outcome
    }

    /// Per-kind raw condition for this frame; kinds whose modality was not
    /// detected are left out so their debouncers keep their state
    fn edge_candidates(
        &mut self,
        snapshot: &FeatureSnapshot,
        now: Duration,
        overlay: &mut Overlay,
    ) -> BTreeMap<GestureKind, bool> {
        let mut candidates = BTreeMap::new();

        if let Some(hand) = &snapshot.hand {
            let present = gestures::classify_hand(hand, &self.config.hand);
            for kind in [
                GestureKind::ThumbsDown,
                GestureKind::OpenPalm,
                GestureKind::ClosedFist,
                GestureKind::VSign,
                GestureKind::Tap,
            ] {
                candidates.insert(kind, present.contains(&kind));
            }

            if self
                .last_hand_at
                .is_some_and(|last| now.saturating_sub(last) > self.trajectory_gap)
            {
                debug!("hand lost for over {:?}, trajectory reset", self.trajectory_gap);
                self.trajectory.clear();
            }
            self.last_hand_at = Some(now);
            self.trajectory.push(hand.index_tip_px);
            let air_v = gestures::is_air_v(&self.trajectory, &self.config.air_v);
            if air_v {
                debug!("air V over {} points", self.trajectory.len());
                self.trajectory.clear();
            }
            candidates.insert(GestureKind::AirV, air_v);
        }

        if let Some(ear) = snapshot.face.and_then(|face| face.eye_aspect_ratio) {
            let smoothed = self.ear_history.push_mean(ear);
            let closed = gestures::eyes_closed(smoothed, &self.config.face);
            overlay.eye = Some((smoothed, closed));
            overlay
                .labels
                .push(if closed { "Eyes closed" } else { "Eyes open" }.to_string());
            candidates.insert(GestureKind::Blink, closed);
        }

        candidates
    }

    /// Drag and scroll; both keep their state on frames without a hand
    fn update_continuous(&mut self, snapshot: &FeatureSnapshot, now: Duration, outcome: &mut FrameOutcome) {
        let Some(hand) = &snapshot.hand else {
            return;
        };

        if self.config.actions.drag {
            let pinch = gestures::is_pinch(hand, &self.config.hand);
            let hold = gestures::holds_pinch(hand, &self.config.hand);
            match self.dispatcher.update_drag(&mut self.input, pinch, hold) {
                Ok(true) => outcome.overlay.labels.push("Dragging...".to_string()),
                Ok(false) => {}
                Err(e) => warn!("Failed to update drag: {}", e),
            }
        }

        if self.config.actions.scroll {
            let drag_active = self.dispatcher.state().drag_active;
            let engaged = gestures::is_scroll_engage(hand, &self.config.hand, drag_active);
            match self
                .dispatcher
                .update_scroll(&mut self.input, engaged, hand.scroll_anchor.y, now)
            {
                Ok(0) => {}
                Ok(delta) => {
                    outcome.scroll_delta = delta;
                    outcome.overlay.labels.push(format!("Scroll {delta}"));
                }
                Err(e) => {
                    warn!("Failed to scroll: {}", e);
                    self.dispatcher.reset_scroll();
                }
            }
        }
    }

    /// Release the held button and close any open recording
    ///
    /// Idempotent; called on every exit path.
    pub fn shutdown(&mut self) {
        self.dispatcher.release_all::<F, I, M>(&mut self.input, &mut self.media);
    }

    /// Pull frames until something stops the loop
    pub fn run<S, E, D, C>(&mut self, source: &mut S, estimator: &mut E, display: &mut D, clock: &C) -> RunSummary
    where
        S: FrameSource<Frame = F>,
        E: LandmarkEstimator<F>,
        D: DisplaySink<F>,
        C: Clock,
    {
        info!("Entering main loop");
        let start_frames = self.frames_processed;

        let exit_reason = loop {
            if self.stop.load(Ordering::SeqCst) {
                info!("Stop requested");
                break ExitReason::Interrupted;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break ExitReason::EndOfStream,
                Err(e) => {
                    warn!("Frame source failed: {}", e);
                    break ExitReason::EndOfStream;
                }
            };

            let now = frame.captured_at().unwrap_or_else(|| clock.elapsed());
            let detection = estimator.detect(&frame).unwrap_or_else(|e| {
                warn!("Landmark estimation failed, treating frame as empty: {}", e);
                Detection::empty()
            });

            let outcome = self.process(&frame, &detection, now, clock.unix_seconds());
            if outcome.exit {
                break ExitReason::ThumbsDown;
            }

            match display.show(&frame, &outcome.overlay) {
                Ok(DisplayControl::Continue) => {}
                Ok(DisplayControl::Quit) => break ExitReason::QuitRequested,
                Err(e) => warn!("Display failed: {}", e),
            }
        };

        self.shutdown();

        let summary = RunSummary {
            frames_processed: self.frames_processed - start_frames,
            exit_reason,
        };
        info!(
            "Session ended after {} frames: {}",
            summary.frames_processed, summary.exit_reason
        );
        summary
    }
}

impl<F, I, M> Drop for GestureSession<F, I, M>
where
    I: InputController,
    M: MediaSink<F>,
{
    fn drop(&mut self) {
        self.dispatcher.release_all::<F, I, M>(&mut self.input, &mut self.media);
    }
}
