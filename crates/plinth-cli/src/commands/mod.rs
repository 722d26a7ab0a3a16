pub mod config;
pub mod live;
pub mod simulate;
pub mod snapshot;

use tracing::debug;

use plinth_core::{AppConfig, FileSnapshotStore, MemorySnapshotStore, ModeEvent, ScrollView, SnapshotStore};

/// How frame reports are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

/// Snapshot store for a replay. `persist` writes to the configured file,
/// the one `plinth snapshot show` reads.
pub(crate) fn snapshot_store(config: &AppConfig, persist: bool) -> Box<dyn SnapshotStore> {
    if persist {
        let store = FileSnapshotStore::from_config(config);
        debug!(path = %store.path().display(), "Persisting scroll snapshots");
        Box::new(store)
    } else {
        Box::new(MemorySnapshotStore::new())
    }
}

pub(crate) fn print_frame(output: Output, at_ms: u64, view: &ScrollView) {
    match output {
        Output::Text => println!(
            "[{:>6}ms] progress={:.4} target={:.4} item={} t={:.2} mode={} scrolling={}{}",
            at_ms,
            view.progress,
            view.target_progress,
            view.current_item_index,
            view.item_transition_t,
            view.mode,
            if view.is_scrolling { "yes" } else { "no" },
            if view.content_settled { " settled" } else { "" },
        ),
        Output::Json => println!(
            "{}",
            serde_json::json!({ "at_ms": at_ms, "frame": view })
        ),
    }
}

pub(crate) fn print_event(output: Output, at_ms: u64, event: &ModeEvent) {
    match output {
        Output::Text => println!("[{:>6}ms] event: {:?}", at_ms, event),
        Output::Json => println!(
            "{}",
            serde_json::json!({ "at_ms": at_ms, "event": event })
        ),
    }
}

pub(crate) fn print_input(output: Output, at_ms: u64, line: &str) {
    match output {
        Output::Text => println!("[{:>6}ms] input: {}", at_ms, line),
        Output::Json => println!(
            "{}",
            serde_json::json!({ "at_ms": at_ms, "input": line })
        ),
    }
}
