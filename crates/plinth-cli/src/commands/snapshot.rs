use anyhow::Result;

use plinth_core::{AppConfig, FileSnapshotStore, SnapshotStore};

pub fn show(config: &AppConfig) -> Result<()> {
    let mut store = FileSnapshotStore::from_config(config);
    let snapshot = match store.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            println!("No saved scroll snapshot.");
            println!("  Path: {}", store.path().display());
            return Ok(());
        }
        Err(e) => {
            println!("Unreadable scroll snapshot, it will be discarded: {}", e);
            println!("  Path: {}", store.path().display());
            return Ok(());
        }
    };

    let max_age = std::time::Duration::from_secs(config.snapshot.max_age_secs);
    let status = match snapshot.validate(config.scroll.max_progress, max_age) {
        Ok(()) => "usable".to_string(),
        Err(e) => format!("will be discarded: {}", e),
    };

    println!("Scroll snapshot ({}):\n", status);
    println!("  Progress:        {:.4}", snapshot.progress);
    println!("  Target:          {:.4}", snapshot.target_progress);
    println!("  Content mode:    {}", if snapshot.was_in_content_mode { "yes" } else { "no" });
    println!("  Window scroll:   {}", snapshot.window_scroll_y);
    println!("  Content scroll:  {}", snapshot.content_scroll_top);
    println!("  Saved at:        {}", snapshot.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Path:            {}", store.path().display());
    Ok(())
}

pub fn clear(config: &AppConfig) -> Result<()> {
    let mut store = FileSnapshotStore::from_config(config);
    store.clear()?;
    println!("Cleared scroll snapshot at {}", store.path().display());
    Ok(())
}
