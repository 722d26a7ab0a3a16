//! Scroll state carried across a page navigation
//!
//! The navigating page saves one snapshot right before it unloads; the page
//! that comes back consumes it once during init, then clears it.

mod file;
mod memory;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedScrollSnapshot {
    pub progress: f64,
    pub target_progress: f64,
    pub window_scroll_y: f64,
    pub content_scroll_top: f64,
    pub was_in_content_mode: bool,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

impl PersistedScrollSnapshot {
    /// Usable snapshots have finite positions inside `[0, max_progress]`
    /// and are younger than `max_age` (zero disables the age check)
    pub fn validate(&self, max_progress: f64, max_age: Duration) -> Result<()> {
        for (name, value) in [
            ("progress", self.progress),
            ("target_progress", self.target_progress),
        ] {
            if !value.is_finite() || value < 0.0 || value > max_progress {
                return Err(Error::Snapshot(format!("{} out of range: {}", name, value)));
            }
        }
        for (name, value) in [
            ("window_scroll_y", self.window_scroll_y),
            ("content_scroll_top", self.content_scroll_top),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Snapshot(format!("{} out of range: {}", name, value)));
            }
        }
        if !max_age.is_zero() {
            let age = Utc::now().signed_duration_since(self.saved_at);
            if age.num_milliseconds() > max_age.as_millis() as i64 {
                return Err(Error::Snapshot(format!(
                    "snapshot is stale ({}s old)",
                    age.num_seconds()
                )));
            }
        }
        Ok(())
    }
}

/// Storage collaborator for navigation snapshots
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &PersistedScrollSnapshot) -> Result<()>;

    /// `Ok(None)` when nothing was saved. Data that exists but cannot be
    /// read back is an error, so the caller can discard it.
    fn load(&mut self) -> Result<Option<PersistedScrollSnapshot>>;

    fn clear(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PersistedScrollSnapshot {
        PersistedScrollSnapshot {
            progress: 1.3,
            target_progress: 1.3,
            window_scroll_y: 0.0,
            content_scroll_top: 840.0,
            was_in_content_mode: true,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_accepts_fresh_snapshot() {
        assert!(snapshot().validate(2.0, Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut snap = snapshot();
        snap.progress = f64::NAN;
        assert!(snap.validate(2.0, Duration::ZERO).is_err());

        let mut snap = snapshot();
        snap.target_progress = 2.5;
        assert!(matches!(
            snap.validate(2.0, Duration::ZERO),
            Err(Error::Snapshot(reason)) if reason.contains("target_progress")
        ));

        let mut snap = snapshot();
        snap.content_scroll_top = -4.0;
        assert!(snap.validate(2.0, Duration::ZERO).is_err());
    }

    #[test]
    fn test_validate_rejects_stale() {
        let mut snap = snapshot();
        snap.saved_at = Utc::now() - chrono::Duration::hours(2);
        assert!(snap.validate(2.0, Duration::from_secs(1800)).is_err());
        assert!(snap.validate(2.0, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_missing_saved_at_defaults_to_now() {
        let json = r#"{"progress":0.5,"target_progress":0.5,"window_scroll_y":0,
            "content_scroll_top":0,"was_in_content_mode":false}"#;
        let snap: PersistedScrollSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.validate(2.0, Duration::from_secs(60)).is_ok());
    }
}
