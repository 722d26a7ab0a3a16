use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use plinth_core::{AppConfig, ManualClock, ScrollCore, ScrollView, SnapshotStore};

use super::{print_event, print_frame, print_input, snapshot_store, Output};
use crate::script::{InputScript, ScriptRunner};

pub struct SimulateOptions {
    pub fps: u32,
    /// Print every Nth frame (events are always printed)
    pub every: u32,
    pub output: Output,
    /// Save snapshots to the data dir instead of memory
    pub persist: bool,
}

pub fn run(config: &AppConfig, script_path: &Path, options: &SimulateOptions) -> Result<()> {
    let script = InputScript::load(script_path)?;
    let mut store = snapshot_store(config, options.persist);
    let view = replay(config, &script, options, store.as_mut())?;

    if options.output == Output::Text {
        println!();
        println!(
            "Final: mode={} item={} progress={:.4}",
            view.mode, view.current_item_index, view.progress
        );
    }
    Ok(())
}

/// Replay a script on a manual clock, one fixed-length frame at a time
pub fn replay(
    config: &AppConfig,
    script: &InputScript,
    options: &SimulateOptions,
    store: &mut dyn SnapshotStore,
) -> Result<ScrollView> {
    if options.fps == 0 {
        bail!("--fps must be at least 1");
    }
    let frame_us = 1_000_000 / options.fps as u64;
    let dt = frame_us as f64 / 1_000_000.0;
    let duration_us = script.duration_ms() * 1_000;
    let every = options.every.max(1) as u64;

    let clock = ManualClock::new();
    let mut core = ScrollCore::new(config, clock.clone());
    let mut runner = ScriptRunner::new(script);

    info!(
        items = core.item_count(),
        fps = options.fps,
        duration_ms = script.duration_ms(),
        events = script.events.len(),
        "Replaying input script"
    );

    let mut elapsed_us = 0;
    let mut frame: u64 = 0;
    let mut view = core.view();
    while elapsed_us <= duration_us {
        let at_ms = elapsed_us / 1_000;
        for line in runner.apply_due(&mut core, store, at_ms) {
            print_input(options.output, at_ms, &line);
        }

        elapsed_us += frame_us;
        clock.advance(std::time::Duration::from_micros(frame_us));
        view = core.frame(dt);
        let at_ms = elapsed_us / 1_000;

        for event in core.take_events() {
            print_event(options.output, at_ms, &event);
        }
        if frame % every == 0 {
            print_frame(options.output, at_ms, &view);
        }
        frame += 1;
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::{FileSnapshotStore, MemorySnapshotStore, Mode};

    fn quiet() -> SimulateOptions {
        SimulateOptions {
            fps: 60,
            every: 1_000_000,
            output: Output::Text,
            persist: false,
        }
    }

    #[test]
    fn test_replay_commits_and_exits() {
        let script = InputScript::parse(
            r#"
            duration_ms = 6000

            [[event]]
            at_ms = 0
            action = "wheel"
            delta = 1400

            [[event]]
            at_ms = 2000
            action = "content_scroll"
            top = 0

            [[event]]
            at_ms = 2100
            action = "wheel"
            delta = -40

            [[event]]
            at_ms = 2120
            action = "wheel"
            delta = -40
            "#,
        )
        .unwrap();
        let mut store = MemorySnapshotStore::new();
        let view = replay(&AppConfig::default(), &script, &quiet(), &mut store).unwrap();
        assert_eq!(view.mode, Mode::Gallery);
        assert_eq!(view.current_item_index, 4);
    }

    #[test]
    fn test_persisted_snapshot_is_readable_by_snapshot_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.general.data_dir = dir.path().to_path_buf();
        let script = InputScript::parse(
            r#"
            duration_ms = 2500

            [[event]]
            at_ms = 0
            action = "wheel"
            delta = 1400

            [[event]]
            at_ms = 2000
            action = "save_snapshot"
            window_scroll_y = 64
            "#,
        )
        .unwrap();
        let options = SimulateOptions { persist: true, ..quiet() };
        let mut store = snapshot_store(&config, options.persist);
        replay(&config, &script, &options, store.as_mut()).unwrap();

        assert!(config.snapshot_path().exists());
        let saved = FileSnapshotStore::from_config(&config).load().unwrap().unwrap();
        assert!(saved.was_in_content_mode);
        assert_eq!(saved.window_scroll_y, 64.0);
        crate::commands::snapshot::show(&config).unwrap();

        crate::commands::snapshot::clear(&config).unwrap();
        assert!(!config.snapshot_path().exists());
    }

    #[test]
    fn test_replay_rejects_zero_fps() {
        let script = InputScript::parse("").unwrap();
        let options = SimulateOptions { fps: 0, ..quiet() };
        let mut store = MemorySnapshotStore::new();
        assert!(replay(&AppConfig::default(), &script, &options, &mut store).is_err());
    }
}
