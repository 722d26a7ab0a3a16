//! L3 Molecular Layer: Scroll state and smoothing
//!
//! `ScrollModel` is the single source of truth for the scroll position.
//! Input only ever moves `target_progress`; `tick` is the one place that
//! advances `progress` toward it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::timing::{approach, smoothing_factor};
use crate::config::{GalleryConfig, ScrollConfig};

/// Source of a raw input delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Wheel delta in pixels, positive = down
    Wheel,
    /// Touch drag distance, positive = forward
    Touch,
    /// Discrete keyboard steps, measured in items
    Key,
}

/// Raw scroll state. Derived fields are refreshed by `ScrollModel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    pub progress: f64,
    pub target_progress: f64,
    pub is_scrolling: bool,
    /// `None` until the first input or jump
    pub last_input: Option<Duration>,
    pub current_item_index: usize,
}

#[derive(Debug, Clone)]
pub struct ScrollModel {
    state: ScrollState,
    config: ScrollConfig,
    item_count: usize,
}

impl ScrollModel {
    pub fn new(config: ScrollConfig, gallery: &GalleryConfig) -> Self {
        Self {
            state: ScrollState::default(),
            config,
            item_count: gallery.item_count.max(1),
        }
    }

    #[inline]
    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.state.progress
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.state.target_progress
    }

    #[inline]
    pub fn is_scrolling(&self) -> bool {
        self.state.is_scrolling
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Time since the last input or jump; unbounded before any input
    pub fn idle_for(&self, now: Duration) -> Duration {
        match self.state.last_input {
            Some(at) => now.saturating_sub(at),
            None => Duration::MAX,
        }
    }

    pub(crate) fn set_scrolling(&mut self, scrolling: bool) {
        self.state.is_scrolling = scrolling;
    }

    /// Rewrite the target without registering input (snap corrections)
    pub(crate) fn set_target(&mut self, value: f64) {
        self.state.target_progress = self.clamp(value);
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.config.max_progress)
    }

    fn sensitivity(&self, kind: InputKind) -> f64 {
        match kind {
            InputKind::Wheel => self.config.wheel_sensitivity,
            InputKind::Touch => self.config.touch_sensitivity,
            InputKind::Key => {
                if self.item_count > 1 {
                    1.0 / (self.item_count - 1) as f64
                } else {
                    1.0
                }
            }
        }
    }

    fn mark_input(&mut self, now: Duration) {
        self.state.is_scrolling = true;
        self.state.last_input = Some(now);
    }

    /// Convert a raw input delta into progress and add it to the target
    pub fn apply_delta(&mut self, raw: f64, kind: InputKind, now: Duration) {
        if !raw.is_finite() {
            return;
        }
        let next = self.state.target_progress + raw * self.sensitivity(kind);
        self.state.target_progress = self.clamp(next);
        self.mark_input(now);
    }

    /// Set the target directly for discrete navigation. `tick` animates
    /// the move; input time is refreshed so snapping does not override it.
    pub fn jump_target(&mut self, value: f64, now: Duration) {
        self.state.target_progress = self.clamp(value);
        self.mark_input(now);
    }

    /// Place progress and target without animation (restore/debug only)
    pub fn set_progress_immediate(&mut self, progress: f64, target: f64) {
        self.state.progress = self.clamp(progress);
        self.state.target_progress = self.clamp(target);
        self.refresh_item_index();
    }

    /// Ease progress toward the target. Call exactly once per frame.
    pub fn tick(&mut self, dt: f64) {
        let speed = if self.state.is_scrolling {
            self.config.active_lerp_speed
        } else {
            self.config.idle_lerp_speed
        };
        let t = smoothing_factor(dt, speed);
        if t > 0.0 {
            self.state.progress = approach(
                self.state.progress,
                self.state.target_progress,
                t,
                self.config.settle_epsilon * 0.1,
            );
        }
        self.refresh_item_index();
    }

    /// Continuous position in item space: (active item, blend to next)
    pub fn item_position(&self) -> (usize, f64) {
        item_position(self.state.progress, self.item_count)
    }

    fn refresh_item_index(&mut self) {
        self.state.current_item_index = self.item_position().0;
    }
}

/// Map progress to item space. Progress beyond the gallery pins to the
/// last item with no blend.
pub fn item_position(progress: f64, item_count: usize) -> (usize, f64) {
    if item_count <= 1 {
        return (0, 0.0);
    }
    let last = item_count - 1;
    let position = progress.clamp(0.0, 1.0) * last as f64;
    let index = (position.floor() as usize).min(last);
    let t = if index == last {
        0.0
    } else {
        position - index as f64
    };
    (index, t)
}
