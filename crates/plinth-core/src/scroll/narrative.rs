//! L1 Application Layer: the owned scroll core
//!
//! One `ScrollCore` per page. The host feeds it input and a frame tick and
//! reads back a `ScrollView` plus queued `ModeEvent`s; every write goes
//! through the methods here, so there is a single mutator per frame.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::mode::{Mode, ModeController, ModeEvent, NavigationOutcome, Section};
use super::snap::{SnapAction, SnapEngine};
use super::state::{InputKind, ScrollModel};
use super::timing::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::snapshot::{PersistedScrollSnapshot, SnapshotStore};

/// Per-frame read model for rendering and UI overlays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollView {
    pub progress: f64,
    pub target_progress: f64,
    pub current_item_index: usize,
    pub item_transition_t: f64,
    pub mode: Mode,
    pub is_scrolling: bool,
    pub content_settled: bool,
}

/// Where the host should send an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRoute {
    /// Consumed by the gallery
    Gallery,
    /// Belongs to the content area's own scrolling
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStep {
    Next,
    Previous,
}

/// Page offsets to re-apply once the document has laid out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoredOffsets {
    pub window_scroll_y: f64,
    pub content_scroll_top: f64,
}

pub struct ScrollCore<C: Clock = SystemClock> {
    clock: C,
    model: ScrollModel,
    snap: SnapEngine,
    modes: ModeController,
    max_progress: f64,
    snapshot_max_age: Duration,
    restored_offsets: Option<RestoredOffsets>,
    frames: u64,
}

impl ScrollCore<SystemClock> {
    pub fn with_system_clock(config: &AppConfig) -> Self {
        Self::new(config, SystemClock::new())
    }
}

impl<C: Clock> ScrollCore<C> {
    pub fn new(config: &AppConfig, clock: C) -> Self {
        let model = ScrollModel::new(config.scroll.clone(), &config.gallery);
        let snap = SnapEngine::new(
            config.snap.clone(),
            config.scroll.idle_timeout(),
            config.scroll.settle_epsilon,
        );
        let modes = ModeController::new(config.snap.clone(), config.sections.clone(), &config.gallery);
        Self {
            clock,
            model,
            snap,
            modes,
            max_progress: config.scroll.max_progress,
            snapshot_max_age: Duration::from_secs(config.snapshot.max_age_secs),
            restored_offsets: None,
            frames: 0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn item_count(&self) -> usize {
        self.model.item_count()
    }

    /// Advance one frame: smooth, apply due rebounds, derive the mode, then
    /// let the snap engine act if input is idle
    pub fn frame(&mut self, dt: f64) -> ScrollView {
        let now = self.clock.now();
        let previous = self.model.progress();
        self.model.tick(dt);
        self.modes.poll_rebound(&mut self.model, now);

        if self.modes.observe(previous, self.model.progress()) {
            debug!(progress = self.model.progress(), "Progress reached engaged threshold");
            self.enter_content_mode();
        }

        let latched = self.modes.is_in_content_mode();
        if let SnapAction::Commit = self.snap.step(&mut self.model, now, latched) {
            debug!(target = self.model.target(), "Overshoot committed to content mode");
            self.enter_content_mode();
        }

        self.frames += 1;
        let view = self.view();
        trace!(
            frame = self.frames,
            progress = view.progress,
            target = view.target_progress,
            mode = %view.mode,
            "frame"
        );
        view
    }

    pub fn view(&self) -> ScrollView {
        let state = self.model.state();
        let (index, t) = self.model.item_position();
        ScrollView {
            progress: state.progress,
            target_progress: state.target_progress,
            current_item_index: index,
            item_transition_t: t,
            mode: self.modes.mode(),
            is_scrolling: state.is_scrolling,
            content_settled: self.modes.is_content_settled(),
        }
    }

    pub fn take_events(&mut self) -> Vec<ModeEvent> {
        self.modes.take_events()
    }

    pub fn is_in_content_mode(&self) -> bool {
        self.modes.is_in_content_mode()
    }

    fn apply_input(&mut self, raw: f64, kind: InputKind) {
        // a fresh forward gesture may commit again after an exit
        if raw > 0.0 {
            self.snap.arm_commit();
        }
        self.model.apply_delta(raw, kind, self.clock.now());
    }

    /// Wheel delta in pixels, positive = down. In content mode the host
    /// scrolls its content area; the core only tracks the exit gesture.
    pub fn on_wheel(&mut self, delta: f64) -> InputRoute {
        if self.modes.is_in_content_mode() {
            let now = self.clock.now();
            self.modes
                .feed_exit_gesture(delta, &mut self.model, &mut self.snap, now);
            return InputRoute::Content;
        }
        self.apply_input(delta, InputKind::Wheel);
        InputRoute::Gallery
    }

    pub fn on_touch(&mut self, delta: f64) -> InputRoute {
        if self.modes.is_in_content_mode() {
            return InputRoute::Content;
        }
        self.apply_input(delta, InputKind::Touch);
        InputRoute::Gallery
    }

    pub fn on_key(&mut self, step: KeyStep) -> InputRoute {
        if self.modes.is_in_content_mode() {
            return InputRoute::Content;
        }
        let raw = match step {
            KeyStep::Next => 1.0,
            KeyStep::Previous => -1.0,
        };
        self.apply_input(raw, InputKind::Key);
        InputRoute::Gallery
    }

    pub fn set_content_scroll_top(&mut self, top: f64) {
        self.modes.set_content_scroll_top(top);
    }

    pub fn jump_to_item(&mut self, index: usize) -> bool {
        let now = self.clock.now();
        self.modes.jump_to_item(index, &mut self.model, now)
    }

    pub fn navigate_to_section(&mut self, section: Section) -> NavigationOutcome {
        let now = self.clock.now();
        self.modes
            .navigate_to_section(section, &mut self.model, &mut self.snap, now)
    }

    pub fn enter_content_mode(&mut self) -> bool {
        self.modes.enter_content_mode(&mut self.model)
    }

    pub fn exit_content_mode(&mut self) -> bool {
        let now = self.clock.now();
        self.modes
            .exit_content_mode(&mut self.model, &mut self.snap, now)
    }

    /// Place progress directly, skipping smoothing. Debug hosts only.
    pub fn debug_set_progress(&mut self, progress: f64) {
        self.model.set_progress_immediate(progress, progress);
        let progress = self.model.progress();
        self.modes.observe(progress, progress);
    }

    pub fn snapshot(&self, window_scroll_y: f64) -> PersistedScrollSnapshot {
        let state = self.model.state();
        PersistedScrollSnapshot {
            progress: state.progress,
            target_progress: state.target_progress,
            window_scroll_y: window_scroll_y.max(0.0),
            content_scroll_top: self.modes.content_scroll_top(),
            was_in_content_mode: self.modes.is_in_content_mode(),
            saved_at: chrono::Utc::now(),
        }
    }

    /// Persist state right before leaving for a detail page
    pub fn before_navigate<S: SnapshotStore + ?Sized>(
        &self,
        store: &mut S,
        window_scroll_y: f64,
    ) -> crate::Result<()> {
        let snapshot = self.snapshot(window_scroll_y);
        debug!(
            progress = snapshot.progress,
            content = snapshot.was_in_content_mode,
            "Saving scroll snapshot"
        );
        store.save(&snapshot)
    }

    /// Consume a saved snapshot during page init. Anything unusable counts
    /// as a first visit. Returns whether state was restored.
    pub fn restore<S: SnapshotStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let loaded = match store.load() {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable scroll snapshot");
                None
            }
        };
        if let Err(e) = store.clear() {
            warn!(error = %e, "Failed to clear consumed scroll snapshot");
        }
        let Some(snapshot) = loaded else {
            return false;
        };
        if let Err(e) = snapshot.validate(self.max_progress, self.snapshot_max_age) {
            warn!(error = %e, "Discarding scroll snapshot");
            return false;
        }

        self.model
            .set_progress_immediate(snapshot.progress, snapshot.target_progress);
        self.modes.restore(
            snapshot.was_in_content_mode,
            self.model.progress(),
            snapshot.content_scroll_top,
        );
        self.restored_offsets = Some(RestoredOffsets {
            window_scroll_y: snapshot.window_scroll_y,
            content_scroll_top: snapshot.content_scroll_top,
        });
        debug!(
            progress = snapshot.progress,
            content = snapshot.was_in_content_mode,
            "Restored scroll snapshot"
        );
        true
    }

    /// Offsets for the second restore pass, once the DOM is ready
    pub fn take_restored_offsets(&mut self) -> Option<RestoredOffsets> {
        self.restored_offsets.take()
    }
}
