//! L3 Molecular Layer: Idle snapping and elastic overshoot
//!
//! Once input has been quiet for the idle timeout, the target is pulled
//! toward a resting value for its zone: the nearest gallery item below
//! 1.0, the last item (elastically) in the overshoot zone, or a content
//! commit past the commit threshold.

use std::time::Duration;

use super::state::ScrollModel;
use super::timing::approach;
use crate::config::SnapConfig;

/// What a snap pass did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapAction {
    /// Input is still active; nothing touched
    Scrolling,
    /// Content mode owns the position
    Suspended,
    /// Target pulled back toward the gallery's last item
    Elastic,
    /// Target eased toward the given item
    Snap { index: usize },
    /// Target is at rest
    Settled,
    /// Target passed the commit threshold; content mode should be entered
    Commit,
}

#[derive(Debug, Clone)]
pub struct SnapEngine {
    config: SnapConfig,
    idle_timeout: Duration,
    epsilon: f64,
    /// Cleared on content exit so the rebound target decays instead of
    /// committing again
    commit_armed: bool,
}

impl SnapEngine {
    pub fn new(config: SnapConfig, idle_timeout: Duration, epsilon: f64) -> Self {
        Self {
            config,
            idle_timeout,
            epsilon,
            commit_armed: true,
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn is_commit_armed(&self) -> bool {
        self.commit_armed
    }

    pub fn arm_commit(&mut self) {
        self.commit_armed = true;
    }

    pub fn disarm_commit(&mut self) {
        self.commit_armed = false;
    }

    /// Run one snap pass. Also decides `is_scrolling` from the idle window.
    pub fn step(&mut self, model: &mut ScrollModel, now: Duration, latched: bool) -> SnapAction {
        if model.idle_for(now) < self.idle_timeout {
            model.set_scrolling(true);
            return SnapAction::Scrolling;
        }
        model.set_scrolling(false);

        if latched {
            return SnapAction::Suspended;
        }

        let target = model.target();
        if target < self.config.commit_threshold {
            self.commit_armed = true;
        }

        if target > 1.0 {
            if target >= self.config.commit_threshold && self.commit_armed {
                return SnapAction::Commit;
            }
            let overshoot = target - 1.0;
            let next = target - overshoot * self.config.elastic_strength;
            if next - 1.0 <= self.epsilon {
                model.set_target(1.0);
            } else {
                model.set_target(next);
            }
            return SnapAction::Elastic;
        }

        let item_count = model.item_count();
        let index = snap_index(target, item_count, self.config.snap_lower, self.config.snap_upper);
        let snap_target = if item_count > 1 {
            index as f64 / (item_count - 1) as f64
        } else {
            0.0
        };
        if target == snap_target {
            return SnapAction::Settled;
        }
        model.set_target(approach(target, snap_target, self.config.snap_speed, self.epsilon));
        SnapAction::Snap { index }
    }
}

/// Choose the item a resting target should gravitate to. Fractions inside
/// the `[lower, upper]` window split at the midpoint, ties going forward.
pub fn snap_index(target: f64, item_count: usize, lower: f64, upper: f64) -> usize {
    if item_count <= 1 {
        return 0;
    }
    let last = item_count - 1;
    let position = target.clamp(0.0, 1.0) * last as f64;
    let index = (position.floor() as usize).min(last);
    let frac = position - index as f64;
    let next = (index + 1).min(last);

    if frac < lower {
        index
    } else if frac > upper {
        next
    } else if frac < 0.5 {
        index
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GalleryConfig, ScrollConfig};
    use crate::scroll::state::InputKind;

    const IDLE: Duration = Duration::from_millis(200);

    fn setup(items: usize, target: f64) -> (ScrollModel, SnapEngine) {
        let mut model = ScrollModel::new(ScrollConfig::default(), &GalleryConfig { item_count: items });
        model.jump_target(target, Duration::ZERO);
        let engine = SnapEngine::new(SnapConfig::default(), Duration::from_millis(150), 1e-4);
        (model, engine)
    }

    fn run_idle(model: &mut ScrollModel, engine: &mut SnapEngine, passes: usize) -> SnapAction {
        let mut last = SnapAction::Settled;
        for _ in 0..passes {
            last = engine.step(model, IDLE, false);
            if last == SnapAction::Commit {
                break;
            }
        }
        last
    }

    #[test]
    fn test_snap_index_window() {
        assert_eq!(snap_index(2.3 / 4.0, 5, 0.4, 0.6), 2);
        assert_eq!(snap_index(2.45 / 4.0, 5, 0.4, 0.6), 2);
        assert_eq!(snap_index(0.625, 5, 0.4, 0.6), 3);
        assert_eq!(snap_index(2.7 / 4.0, 5, 0.4, 0.6), 3);
        assert_eq!(snap_index(1.0, 5, 0.4, 0.6), 4);
        assert_eq!(snap_index(0.9, 1, 0.4, 0.6), 0);
    }

    #[test]
    fn test_no_action_while_scrolling() {
        let (mut model, mut engine) = setup(5, 0.575);
        let action = engine.step(&mut model, Duration::from_millis(149), false);
        assert_eq!(action, SnapAction::Scrolling);
        assert!(model.is_scrolling());
        assert_eq!(model.target(), 0.575);
    }

    #[test]
    fn test_idle_clears_scrolling_flag() {
        let (mut model, mut engine) = setup(5, 0.5);
        let action = engine.step(&mut model, Duration::from_millis(150), false);
        assert_eq!(action, SnapAction::Settled);
        assert!(!model.is_scrolling());
    }

    #[test]
    fn test_model_without_input_is_idle() {
        let mut model = ScrollModel::new(ScrollConfig::default(), &GalleryConfig { item_count: 5 });
        model.set_progress_immediate(0.575, 0.575);
        let mut engine = SnapEngine::new(SnapConfig::default(), Duration::from_millis(150), 1e-4);
        assert_eq!(engine.step(&mut model, Duration::ZERO, false), SnapAction::Snap { index: 2 });
        assert!(!model.is_scrolling());
    }

    #[test]
    fn test_snaps_back_below_window() {
        let (mut model, mut engine) = setup(5, 2.3 / 4.0);
        assert_eq!(run_idle(&mut model, &mut engine, 500), SnapAction::Settled);
        assert_eq!(model.target(), 0.5);
    }

    #[test]
    fn test_snaps_forward_above_window() {
        let (mut model, mut engine) = setup(5, 2.7 / 4.0);
        assert_eq!(run_idle(&mut model, &mut engine, 500), SnapAction::Settled);
        assert_eq!(model.target(), 0.75);
    }

    #[test]
    fn test_midpoint_goes_to_next_item() {
        let (mut model, mut engine) = setup(5, 0.625);
        assert_eq!(run_idle(&mut model, &mut engine, 500), SnapAction::Settled);
        assert_eq!(model.target(), 0.75);
    }

    #[test]
    fn test_snap_is_gradual() {
        let (mut model, mut engine) = setup(5, 2.3 / 4.0);
        let action = engine.step(&mut model, IDLE, false);
        assert_eq!(action, SnapAction::Snap { index: 2 });
        let expected = 0.575 + (0.5 - 0.575) * 0.05;
        assert!((model.target() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_item_gallery_rests_at_zero() {
        let (mut model, mut engine) = setup(1, 0.6);
        run_idle(&mut model, &mut engine, 500);
        assert_eq!(model.target(), 0.0);
    }

    #[test]
    fn test_below_commit_threshold_never_commits() {
        let (mut model, mut engine) = setup(5, 1.099);
        for _ in 0..2_000 {
            let action = engine.step(&mut model, IDLE, false);
            assert_ne!(action, SnapAction::Commit);
            assert!(model.target() >= 1.0);
        }
        assert_eq!(model.target(), 1.0);
    }

    #[test]
    fn test_elastic_decay_is_geometric() {
        let (mut model, mut engine) = setup(5, 1.05);
        assert_eq!(engine.step(&mut model, IDLE, false), SnapAction::Elastic);
        assert!((model.target() - (1.0 + 0.05 * 0.92)).abs() < 1e-12);
    }

    #[test]
    fn test_commit_at_threshold() {
        let (mut model, mut engine) = setup(5, 1.10);
        assert_eq!(engine.step(&mut model, IDLE, false), SnapAction::Commit);
        assert_eq!(model.target(), 1.10);
    }

    #[test]
    fn test_disarmed_commit_decays_until_rearmed() {
        let (mut model, mut engine) = setup(5, 1.15);
        engine.disarm_commit();
        assert_eq!(engine.step(&mut model, IDLE, false), SnapAction::Elastic);
        for _ in 0..20 {
            engine.step(&mut model, IDLE, false);
        }
        assert!(model.target() < 1.1);
        assert!(engine.is_commit_armed());
    }

    #[test]
    fn test_latched_suspends_snapping() {
        let (mut model, mut engine) = setup(5, 1.3);
        assert_eq!(engine.step(&mut model, IDLE, true), SnapAction::Suspended);
        assert_eq!(model.target(), 1.3);
    }

    #[test]
    fn test_input_after_idle_resets_window() {
        let (mut model, mut engine) = setup(5, 0.3);
        model.apply_delta(10.0, InputKind::Wheel, IDLE);
        assert_eq!(
            engine.step(&mut model, IDLE + Duration::from_millis(10), false),
            SnapAction::Scrolling
        );
    }
}
