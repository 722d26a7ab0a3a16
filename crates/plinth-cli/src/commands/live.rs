use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

use plinth_core::{AppConfig, Clock, ScrollCore, ScrollView, SnapshotStore};

use super::{print_event, print_frame, print_input, snapshot_store, Output};
use crate::script::{InputScript, ScriptRunner};

/// Clock on tokio's timer, so paused test time drives idle detection too
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub async fn run(
    config: &AppConfig,
    script_path: &Path,
    fps: u32,
    output: Output,
    persist: bool,
) -> Result<()> {
    let script = InputScript::load(script_path)?;
    let mut store = snapshot_store(config, persist);
    let view = drive(config, &script, fps, output, store.as_mut()).await?;
    if output == Output::Text {
        println!();
        println!(
            "Final: mode={} item={} progress={:.4}",
            view.mode, view.current_item_index, view.progress
        );
    }
    Ok(())
}

/// Run the script in real time, measuring frame deltas from the timer
pub async fn drive(
    config: &AppConfig,
    script: &InputScript,
    fps: u32,
    output: Output,
    store: &mut dyn SnapshotStore,
) -> Result<ScrollView> {
    if fps == 0 {
        bail!("--fps must be at least 1");
    }
    let clock = TokioClock::new();
    let mut core = ScrollCore::new(config, clock.clone());
    let mut runner = ScriptRunner::new(script);
    let duration = Duration::from_millis(script.duration_ms());

    let mut ticker = interval(Duration::from_secs_f64(1.0 / fps as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(fps, duration_ms = script.duration_ms(), "Driving input script in real time");

    let mut last = clock.now();
    let mut view = core.view();
    loop {
        ticker.tick().await;
        let now = clock.now();
        let at_ms = now.as_millis() as u64;

        for line in runner.apply_due(&mut core, store, at_ms) {
            print_input(output, at_ms, &line);
        }

        view = core.frame((now - last).as_secs_f64());
        last = now;

        for event in core.take_events() {
            print_event(output, at_ms, &event);
        }
        print_frame(output, at_ms, &view);

        if now >= duration {
            break;
        }
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::{MemorySnapshotStore, Mode};

    #[tokio::test(start_paused = true)]
    async fn test_drive_commits_on_paused_clock() {
        let script = InputScript::parse(
            r#"
            duration_ms = 2000

            [[event]]
            at_ms = 0
            action = "wheel"
            delta = 1400
            "#,
        )
        .unwrap();
        let mut store = MemorySnapshotStore::new();
        let view = drive(&AppConfig::default(), &script, 60, Output::Json, &mut store)
            .await
            .unwrap();
        assert_eq!(view.mode, Mode::Content);
        assert!(view.content_settled);
    }

    #[tokio::test]
    async fn test_drive_rejects_zero_fps() {
        let script = InputScript::parse("").unwrap();
        let mut store = MemorySnapshotStore::new();
        assert!(drive(&AppConfig::default(), &script, 0, Output::Text, &mut store)
            .await
            .is_err());
    }
}
