//! Scroll-to-narrative state machine
//!
//! One continuous scroll signal drives gallery item selection, magnetic
//! snapping, the elastic overshoot past the last artwork and the commit
//! into the scrolling content document.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `timing` - Clock sources and interpolation helpers
//! - `exit_gesture` - Upward-at-top accumulator for leaving content mode
//!
//! ## L3 Molecular Layer
//! - `state` - `ScrollModel`: target/progress and smoothing
//! - `snap` - `SnapEngine`: idle snapping, elastic return, commit
//!
//! ## L2 Organism Layer
//! - `mode` - `ModeController`: latch, mode derivation, navigation, events
//!
//! ## L1 Application Layer
//! - `narrative` - `ScrollCore`: owned instance the host drives each frame
//!
//! # Usage
//!
//! ```ignore
//! use plinth_core::{AppConfig, ScrollCore};
//!
//! let mut core = ScrollCore::with_system_clock(&AppConfig::default());
//!
//! // Input callbacks
//! core.on_wheel(event_delta_y);
//!
//! // Render loop
//! let view = core.frame(dt);
//! for event in core.take_events() {
//!     ui.apply(event);
//! }
//! ```

// L4 Atomic Layer
pub mod exit_gesture;
pub mod timing;

// L3 Molecular Layer
pub mod snap;
pub mod state;

// L2 Organism Layer
pub mod mode;

// L1 Application Layer
pub mod narrative;

// Re-exports for convenient access
pub use narrative::{InputRoute, KeyStep, RestoredOffsets, ScrollCore, ScrollView};
pub use exit_gesture::ExitGesture;
pub use mode::{Mode, ModeController, ModeEvent, NavigationOutcome, Section};
pub use snap::{SnapAction, SnapEngine};
pub use state::{InputKind, ScrollModel, ScrollState};
pub use timing::{Clock, ManualClock, SystemClock};
