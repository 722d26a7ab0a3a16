pub mod config;
pub mod error;
pub mod scroll;
pub mod snapshot;

pub use config::{AppConfig, GalleryConfig, ScrollConfig, SectionConfig, SnapConfig, SnapshotConfig};
pub use error::{Error, Result};
pub use scroll::{
    Clock, InputKind, InputRoute, KeyStep, ManualClock, Mode, ModeEvent, NavigationOutcome,
    RestoredOffsets, ScrollCore, ScrollView, Section, SystemClock,
};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, PersistedScrollSnapshot, SnapshotStore};
