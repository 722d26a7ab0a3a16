//! L2 Organism Layer: Mode derivation, the content latch and navigation
//!
//! `ModeController` is the only writer of the content-mode latch. Each
//! transition pushes a `ModeEvent` for the UI and rendering adapters to
//! consume; nothing here touches presentation directly.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::exit_gesture::ExitGesture;
use super::snap::SnapEngine;
use super::state::ScrollModel;
use crate::config::{GalleryConfig, SectionConfig, SnapConfig};

/// Content scroll offsets at or under this count as "at the top"
const CONTENT_TOP_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Progress within the item range
    Gallery,
    /// Past the last item, short of the commit threshold
    Overshoot,
    /// Unlatched at or beyond the commit threshold. A snap commit sets the
    /// latch directly, so this only shows up while continuous input is
    /// still carrying progress toward the engage point.
    ContentEntering,
    /// Content latch set; progress no longer decides the mode
    Content,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Gallery => "gallery",
            Mode::Overshoot => "overshoot",
            Mode::ContentEntering => "content-entering",
            Mode::Content => "content",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition notifications for UI and rendering collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ModeEvent {
    /// Progress left the gallery upward; transition visuals may start
    EnterOvershoot,
    /// Progress fell back into the gallery
    ReturnToGallery,
    EnterContent,
    ExitContent,
    /// Content is fully in view; per-frame gallery work may pause
    ContentSettled,
    /// Host should scroll the content area to this anchor
    ScrollContentTo { anchor: String },
    /// Host should leave the page
    NavigateExternal { url: String },
}

/// Named destinations in the site navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Hero,
    CategoryHub,
    Artist,
    Works,
    Contact,
}

impl FromStr for Section {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "hero" => Ok(Section::Hero),
            "category_hub" | "categories" => Ok(Section::CategoryHub),
            "artist" => Ok(Section::Artist),
            "works" => Ok(Section::Works),
            "contact" => Ok(Section::Contact),
            other => Err(crate::Error::Other(format!("Unknown section: {}", other))),
        }
    }
}

/// Where a section navigation ended up
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// Gallery target progress
    Gallery { target: f64 },
    /// Content mode, scrolled to an anchor
    Content { anchor: String },
    /// Left the page; no local state changed
    External { url: String },
}

/// A target write re-applied after a delay to cancel elastic rebound
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRebound {
    due: Duration,
    target: f64,
}

#[derive(Debug, Clone)]
pub struct ModeController {
    snap: SnapConfig,
    sections: SectionConfig,
    gallery: GalleryConfig,
    latched: bool,
    settled: bool,
    mode: Mode,
    content_scroll_top: f64,
    exit_gesture: ExitGesture,
    pending_rebound: Option<PendingRebound>,
    events: Vec<ModeEvent>,
}

impl ModeController {
    pub fn new(snap: SnapConfig, sections: SectionConfig, gallery: &GalleryConfig) -> Self {
        let exit_gesture = ExitGesture::new(snap.exit_gesture_threshold);
        Self {
            snap,
            sections,
            gallery: gallery.clone(),
            latched: false,
            settled: false,
            mode: Mode::Gallery,
            content_scroll_top: 0.0,
            exit_gesture,
            pending_rebound: None,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_in_content_mode(&self) -> bool {
        self.latched
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Latched and far enough in that the gallery is fully hidden
    #[inline]
    pub fn is_content_settled(&self) -> bool {
        self.settled
    }

    pub fn content_scroll_top(&self) -> f64 {
        self.content_scroll_top
    }

    pub fn exit_gesture(&self) -> &ExitGesture {
        &self.exit_gesture
    }

    pub fn has_pending_rebound(&self) -> bool {
        self.pending_rebound.is_some()
    }

    pub fn take_events(&mut self) -> Vec<ModeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Mode for a progress value under the current latch
    pub fn derive(&self, progress: f64) -> Mode {
        if self.latched {
            Mode::Content
        } else if progress <= 1.0 {
            Mode::Gallery
        } else if progress < self.snap.commit_threshold {
            Mode::Overshoot
        } else {
            Mode::ContentEntering
        }
    }

    /// Re-derive the mode after a tick and emit zone changes. Returns true
    /// when progress crossed the engaged threshold upward without the
    /// latch, which should enter content mode.
    pub fn observe(&mut self, previous_progress: f64, progress: f64) -> bool {
        let next = self.derive(progress);
        match (self.mode, next) {
            (Mode::Gallery, Mode::Overshoot | Mode::ContentEntering) => {
                self.events.push(ModeEvent::EnterOvershoot);
            }
            (Mode::Overshoot | Mode::ContentEntering | Mode::Content, Mode::Gallery) => {
                self.events.push(ModeEvent::ReturnToGallery);
            }
            _ => {}
        }
        self.mode = next;

        if self.latched && !self.settled && progress >= self.snap.engaged_threshold {
            self.settled = true;
            self.events.push(ModeEvent::ContentSettled);
        }

        !self.latched
            && previous_progress < self.snap.engaged_threshold
            && progress >= self.snap.engaged_threshold
    }

    /// Commit to content mode. No-op if already latched.
    pub fn enter_content_mode(&mut self, model: &mut ScrollModel) -> bool {
        if self.latched {
            return false;
        }
        self.latched = true;
        self.settled = false;
        self.mode = Mode::Content;
        self.content_scroll_top = 0.0;
        self.exit_gesture.reset();
        self.pending_rebound = None;
        if model.target() < self.snap.engaged_threshold {
            model.set_target(self.snap.engaged_threshold);
        }
        debug!(progress = model.progress(), "Entered content mode");
        self.events.push(ModeEvent::EnterContent);
        true
    }

    /// Leave content mode into the elastic zone. No-op if not latched.
    pub fn exit_content_mode(
        &mut self,
        model: &mut ScrollModel,
        snap: &mut SnapEngine,
        now: Duration,
    ) -> bool {
        if !self.latched {
            return false;
        }
        self.latched = false;
        self.settled = false;
        self.exit_gesture.reset();
        self.mode = self.derive(model.progress());
        model.jump_target(self.snap.exit_rebound_target, now);
        snap.disarm_commit();
        debug!(
            progress = model.progress(),
            target = model.target(),
            "Exited content mode"
        );
        self.events.push(ModeEvent::ExitContent);
        true
    }

    /// Jump to a gallery item, clamping the index. Ignored in content mode.
    pub fn jump_to_item(&mut self, index: usize, model: &mut ScrollModel, now: Duration) -> bool {
        if self.latched {
            return false;
        }
        self.pending_rebound = None;
        model.jump_target(self.item_progress(index), now);
        true
    }

    pub fn navigate_to_section(
        &mut self,
        section: Section,
        model: &mut ScrollModel,
        snap: &mut SnapEngine,
        now: Duration,
    ) -> NavigationOutcome {
        match section {
            Section::Hero => self.return_to_gallery(0.0, model, snap, now),
            Section::CategoryHub => {
                let target = self.item_progress(self.sections.category_hub_item);
                self.return_to_gallery(target, model, snap, now)
            }
            Section::Artist | Section::Works => {
                let anchor = if section == Section::Artist {
                    self.sections.artist_anchor.clone()
                } else {
                    self.sections.works_anchor.clone()
                };
                self.enter_content_mode(model);
                self.events.push(ModeEvent::ScrollContentTo {
                    anchor: anchor.clone(),
                });
                NavigationOutcome::Content { anchor }
            }
            Section::Contact => {
                let url = self.sections.contact_url.clone();
                debug!(url = %url, "Leaving for contact page");
                self.events.push(ModeEvent::NavigateExternal { url: url.clone() });
                NavigationOutcome::External { url }
            }
        }
    }

    fn return_to_gallery(
        &mut self,
        target: f64,
        model: &mut ScrollModel,
        snap: &mut SnapEngine,
        now: Duration,
    ) -> NavigationOutcome {
        self.pending_rebound = None;
        if self.exit_content_mode(model, snap, now) {
            self.pending_rebound = Some(PendingRebound {
                due: now + self.snap.hero_rebound_delay(),
                target,
            });
        }
        model.jump_target(target, now);
        NavigationOutcome::Gallery { target }
    }

    /// Re-apply a delayed gallery target once it is due
    pub fn poll_rebound(&mut self, model: &mut ScrollModel, now: Duration) -> bool {
        match self.pending_rebound {
            Some(rebound) if now >= rebound.due => {
                self.pending_rebound = None;
                model.jump_target(rebound.target, now);
                debug!(target = rebound.target, "Re-applied gallery target after exit");
                true
            }
            _ => false,
        }
    }

    /// Record the host's content scroll offset. Leaving the top edge
    /// cancels a partial exit gesture.
    pub fn set_content_scroll_top(&mut self, top: f64) {
        self.content_scroll_top = if top.is_finite() { top.max(0.0) } else { 0.0 };
        if self.content_scroll_top > CONTENT_TOP_TOLERANCE {
            self.exit_gesture.reset();
        }
    }

    /// Feed a content-mode wheel delta to the exit gesture; leaves content
    /// mode when the gesture completes
    pub fn feed_exit_gesture(
        &mut self,
        delta: f64,
        model: &mut ScrollModel,
        snap: &mut SnapEngine,
        now: Duration,
    ) -> bool {
        if !self.latched {
            return false;
        }
        let at_top = self.content_scroll_top <= CONTENT_TOP_TOLERANCE;
        if self.exit_gesture.feed(delta, at_top) {
            return self.exit_content_mode(model, snap, now);
        }
        false
    }

    /// Restore the latch from a persisted snapshot
    pub(crate) fn restore(&mut self, in_content: bool, progress: f64, content_scroll_top: f64) {
        self.latched = in_content;
        self.mode = self.derive(progress);
        self.settled = in_content && progress >= self.snap.engaged_threshold;
        self.content_scroll_top = content_scroll_top.max(0.0);
        self.exit_gesture.reset();
        self.pending_rebound = None;
        if in_content {
            self.events.push(ModeEvent::EnterContent);
        }
    }

    fn item_progress(&self, index: usize) -> f64 {
        index.min(self.gallery.last_index()) as f64 * self.gallery.item_span()
    }
}
