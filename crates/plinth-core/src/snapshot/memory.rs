use super::{PersistedScrollSnapshot, SnapshotStore};

/// In-process store, the stand-in for session storage
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Option<PersistedScrollSnapshot>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<&PersistedScrollSnapshot> {
        self.slot.as_ref()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, snapshot: &PersistedScrollSnapshot) -> crate::Result<()> {
        self.slot = Some(snapshot.clone());
        Ok(())
    }

    fn load(&mut self) -> crate::Result<Option<PersistedScrollSnapshot>> {
        Ok(self.slot.clone())
    }

    fn clear(&mut self) -> crate::Result<()> {
        self.slot = None;
        Ok(())
    }
}
