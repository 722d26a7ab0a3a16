//! Timed input scripts replayed against a `ScrollCore`
//!
//! ```toml
//! duration_ms = 4000
//!
//! [[event]]
//! at_ms = 0
//! action = "wheel"
//! delta = 1400
//!
//! [[event]]
//! at_ms = 2500
//! action = "section"
//! section = "hero"
//! ```

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use plinth_core::{Clock, KeyStep, ScrollCore, Section, SnapshotStore};

#[derive(Debug, Clone, Deserialize)]
pub struct InputScript {
    /// How long to run; defaults to one second past the last event
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default, rename = "event")]
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Wheel { delta: f64 },
    Touch { delta: f64 },
    Key { step: KeyStep },
    JumpToItem { index: usize },
    Section { section: Section },
    EnterContent,
    ExitContent,
    ContentScroll { top: f64 },
    SaveSnapshot {
        #[serde(default)]
        window_scroll_y: f64,
    },
    RestoreSnapshot,
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut script: Self = toml::from_str(content)?;
        script.events.sort_by_key(|e| e.at_ms);
        Ok(script)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.unwrap_or_else(|| {
            self.events.last().map(|e| e.at_ms).unwrap_or(0) + 1_000
        })
    }
}

/// Feeds script events to the core as their time comes due
pub struct ScriptRunner {
    pending: VecDeque<ScriptEvent>,
}

impl ScriptRunner {
    pub fn new(script: &InputScript) -> Self {
        Self {
            pending: script.events.iter().cloned().collect(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every event due at or before `now_ms`. Returns a line per
    /// event describing what the core did with it.
    pub fn apply_due<C: Clock>(
        &mut self,
        core: &mut ScrollCore<C>,
        store: &mut dyn SnapshotStore,
        now_ms: u64,
    ) -> Vec<String> {
        let mut applied = Vec::new();
        while self.pending.front().is_some_and(|e| e.at_ms <= now_ms) {
            if let Some(event) = self.pending.pop_front() {
                applied.push(apply(core, store, &event.action));
            }
        }
        applied
    }
}

fn apply<C: Clock>(
    core: &mut ScrollCore<C>,
    store: &mut dyn SnapshotStore,
    action: &ScriptAction,
) -> String {
    match action {
        ScriptAction::Wheel { delta } => format!("wheel {} -> {:?}", delta, core.on_wheel(*delta)),
        ScriptAction::Touch { delta } => format!("touch {} -> {:?}", delta, core.on_touch(*delta)),
        ScriptAction::Key { step } => format!("key {:?} -> {:?}", step, core.on_key(*step)),
        ScriptAction::JumpToItem { index } => {
            let accepted = core.jump_to_item(*index);
            format!("jump to item {} ({})", index, if accepted { "ok" } else { "ignored in content" })
        }
        ScriptAction::Section { section } => {
            format!("section {:?} -> {:?}", section, core.navigate_to_section(*section))
        }
        ScriptAction::EnterContent => format!("enter content (changed: {})", core.enter_content_mode()),
        ScriptAction::ExitContent => format!("exit content (changed: {})", core.exit_content_mode()),
        ScriptAction::ContentScroll { top } => {
            core.set_content_scroll_top(*top);
            format!("content scroll top {}", top)
        }
        ScriptAction::SaveSnapshot { window_scroll_y } => {
            match core.before_navigate(store, *window_scroll_y) {
                Ok(()) => "snapshot saved".to_string(),
                Err(e) => format!("snapshot save failed: {}", e),
            }
        }
        ScriptAction::RestoreSnapshot => {
            if core.restore(store) {
                format!("snapshot restored: {:?}", core.take_restored_offsets())
            } else {
                "no usable snapshot".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::{AppConfig, ManualClock, MemorySnapshotStore};

    const SCRIPT: &str = r#"
        duration_ms = 3000

        [[event]]
        at_ms = 500
        action = "section"
        section = "works"

        [[event]]
        at_ms = 0
        action = "wheel"
        delta = 400

        [[event]]
        at_ms = 100
        action = "key"
        step = "next"
    "#;

    #[test]
    fn test_parse_sorts_events() {
        let script = InputScript::parse(SCRIPT).unwrap();
        let times: Vec<u64> = script.events.iter().map(|e| e.at_ms).collect();
        assert_eq!(times, vec![0, 100, 500]);
        assert_eq!(script.duration_ms(), 3000);
    }

    #[test]
    fn test_default_duration_follows_last_event() {
        let script = InputScript::parse("[[event]]\nat_ms = 250\naction = \"exit_content\"\n").unwrap();
        assert_eq!(script.duration_ms(), 1250);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(InputScript::parse("[[event]]\nat_ms = 0\naction = \"teleport\"\n").is_err());
    }

    #[test]
    fn test_runner_applies_only_due_events() {
        let script = InputScript::parse(SCRIPT).unwrap();
        let mut runner = ScriptRunner::new(&script);
        let mut core = ScrollCore::new(&AppConfig::default(), ManualClock::new());
        let mut store = MemorySnapshotStore::new();

        assert_eq!(runner.apply_due(&mut core, &mut store, 100).len(), 2);
        assert!(!core.is_in_content_mode());
        assert!(!runner.is_done());

        let lines = runner.apply_due(&mut core, &mut store, 600);
        assert_eq!(lines.len(), 1);
        assert!(core.is_in_content_mode());
        assert!(runner.is_done());
    }

    #[test]
    fn test_snapshot_actions_round_trip() {
        let script = InputScript::parse(
            r#"
            [[event]]
            at_ms = 0
            action = "enter_content"

            [[event]]
            at_ms = 10
            action = "save_snapshot"
            window_scroll_y = 80

            [[event]]
            at_ms = 20
            action = "restore_snapshot"
            "#,
        )
        .unwrap();
        let mut runner = ScriptRunner::new(&script);
        let mut core = ScrollCore::new(&AppConfig::default(), ManualClock::new());
        let mut store = MemorySnapshotStore::new();

        let lines = runner.apply_due(&mut core, &mut store, 20);
        assert_eq!(lines[1], "snapshot saved");
        assert!(lines[2].starts_with("snapshot restored"));
        assert!(store.peek().is_none());
    }
}
