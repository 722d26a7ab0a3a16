use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::Error;
use super::{PersistedScrollSnapshot, SnapshotStore};

/// JSON file store, one snapshot per file
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &crate::AppConfig) -> Self {
        Self::new(config.snapshot_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&mut self, snapshot: &PersistedScrollSnapshot) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        // readers only ever see a complete file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&mut self) -> crate::Result<Option<PersistedScrollSnapshot>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Malformed scroll snapshot");
            Error::Snapshot(format!("malformed snapshot {}: {}", self.path.display(), e))
        })
    }

    fn clear(&mut self) -> crate::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot() -> PersistedScrollSnapshot {
        PersistedScrollSnapshot {
            progress: 0.75,
            target_progress: 0.75,
            window_scroll_y: 120.0,
            content_scroll_top: 0.0,
            was_in_content_mode: false,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSnapshotStore::new(dir.path().join("nested").join("snap.json"));

        assert!(store.load().unwrap().is_none());
        let saved = snapshot();
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_file_is_a_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut store = FileSnapshotStore::new(&path);
        assert!(matches!(store.load(), Err(Error::Snapshot(_))));
        assert!(path.exists());
    }
}
