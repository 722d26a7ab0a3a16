use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default)]
    pub sections: SectionConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (holds the navigation snapshot)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Number of artworks in the 3D gallery (fixed for the lifetime of a page)
    #[serde(default = "default_item_count")]
    pub item_count: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            item_count: default_item_count(),
        }
    }
}

impl GalleryConfig {
    /// Width of one item in progress units; 0 for a single-item gallery
    pub fn item_span(&self) -> f64 {
        if self.item_count > 1 {
            1.0 / (self.item_count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn last_index(&self) -> usize {
        self.item_count.saturating_sub(1)
    }
}

/// Input sensitivity and smoothing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Progress per wheel pixel
    #[serde(default = "default_wheel_sensitivity")]
    pub wheel_sensitivity: f64,
    /// Progress per unit of touch drag
    #[serde(default = "default_touch_sensitivity")]
    pub touch_sensitivity: f64,
    /// Lerp speed while input is active
    #[serde(default = "default_active_lerp_speed")]
    pub active_lerp_speed: f64,
    /// Lerp speed while settling
    #[serde(default = "default_idle_lerp_speed")]
    pub idle_lerp_speed: f64,
    /// Upper bound for progress and target progress
    #[serde(default = "default_max_progress")]
    pub max_progress: f64,
    /// Quiet period after the last input before snapping starts
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// Distance under which an eased value lands exactly on its goal
    #[serde(default = "default_settle_epsilon")]
    pub settle_epsilon: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel_sensitivity: default_wheel_sensitivity(),
            touch_sensitivity: default_touch_sensitivity(),
            active_lerp_speed: default_active_lerp_speed(),
            idle_lerp_speed: default_idle_lerp_speed(),
            max_progress: default_max_progress(),
            idle_timeout_ms: default_idle_timeout_ms(),
            settle_epsilon: default_settle_epsilon(),
        }
    }
}

impl ScrollConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Snapping, overshoot and content-mode thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Idle target at or past this commits to content mode
    #[serde(default = "default_commit_threshold")]
    pub commit_threshold: f64,
    /// Progress at which content is fully in view and gallery work may pause
    #[serde(default = "default_engaged_threshold")]
    pub engaged_threshold: f64,
    /// Fraction of the overshoot removed per idle tick
    #[serde(default = "default_elastic_strength")]
    pub elastic_strength: f64,
    /// Fraction of the distance to the snap target covered per idle tick
    #[serde(default = "default_snap_speed")]
    pub snap_speed: f64,
    /// Fractions below this snap back to the current item
    #[serde(default = "default_snap_lower")]
    pub snap_lower: f64,
    /// Fractions above this snap forward to the next item
    #[serde(default = "default_snap_upper")]
    pub snap_upper: f64,
    /// Target progress written when leaving content mode
    #[serde(default = "default_exit_rebound_target")]
    pub exit_rebound_target: f64,
    /// Accumulated upward wheel distance that leaves content mode
    #[serde(default = "default_exit_gesture_threshold")]
    pub exit_gesture_threshold: f64,
    /// Delay before the hero navigation re-asserts its target
    #[serde(default = "default_hero_rebound_delay_ms")]
    pub hero_rebound_delay_ms: u64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            commit_threshold: default_commit_threshold(),
            engaged_threshold: default_engaged_threshold(),
            elastic_strength: default_elastic_strength(),
            snap_speed: default_snap_speed(),
            snap_lower: default_snap_lower(),
            snap_upper: default_snap_upper(),
            exit_rebound_target: default_exit_rebound_target(),
            exit_gesture_threshold: default_exit_gesture_threshold(),
            hero_rebound_delay_ms: default_hero_rebound_delay_ms(),
        }
    }
}

impl SnapConfig {
    pub fn hero_rebound_delay(&self) -> Duration {
        Duration::from_millis(self.hero_rebound_delay_ms)
    }
}

/// Where each named section of the site lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Gallery item shown by the category hub
    #[serde(default = "default_category_hub_item")]
    pub category_hub_item: usize,
    /// Content anchor for the artist biography
    #[serde(default = "default_artist_anchor")]
    pub artist_anchor: String,
    /// Content anchor for the works listing
    #[serde(default = "default_works_anchor")]
    pub works_anchor: String,
    /// Page the contact link leaves to
    #[serde(default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            category_hub_item: default_category_hub_item(),
            artist_anchor: default_artist_anchor(),
            works_anchor: default_works_anchor(),
            contact_url: default_contact_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// File name inside the data directory
    #[serde(default = "default_snapshot_file")]
    pub file_name: String,
    /// Snapshots older than this are ignored (0 = never expire)
    #[serde(default = "default_snapshot_max_age")]
    pub max_age_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            file_name: default_snapshot_file(),
            max_age_secs: default_snapshot_max_age(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plinth")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_item_count() -> usize {
    5
}

fn default_wheel_sensitivity() -> f64 {
    0.0008
}

fn default_touch_sensitivity() -> f64 {
    0.003
}

fn default_active_lerp_speed() -> f64 {
    12.0
}

fn default_idle_lerp_speed() -> f64 {
    6.0
}

fn default_max_progress() -> f64 {
    2.0
}

fn default_idle_timeout_ms() -> u64 {
    150
}

fn default_settle_epsilon() -> f64 {
    1e-4
}

fn default_commit_threshold() -> f64 {
    1.1
}

fn default_engaged_threshold() -> f64 {
    1.3
}

fn default_elastic_strength() -> f64 {
    0.08
}

fn default_snap_speed() -> f64 {
    0.05
}

fn default_snap_lower() -> f64 {
    0.4
}

fn default_snap_upper() -> f64 {
    0.6
}

fn default_exit_rebound_target() -> f64 {
    1.15 // lands in the elastic zone so the return is a decay, not a jump
}

fn default_exit_gesture_threshold() -> f64 {
    50.0
}

fn default_hero_rebound_delay_ms() -> u64 {
    100
}

fn default_category_hub_item() -> usize {
    1
}

fn default_artist_anchor() -> String {
    "artist".to_string()
}

fn default_works_anchor() -> String {
    "works".to_string()
}

fn default_contact_url() -> String {
    "contact.html".to_string()
}

fn default_snapshot_file() -> String {
    "scroll-snapshot.json".to_string()
}

fn default_snapshot_max_age() -> u64 {
    1800 // 30 minutes, roughly a browsing session
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Reject values the state machine cannot operate with
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: String| -> crate::Result<()> { Err(crate::Error::Config(msg)) };

        if self.gallery.item_count == 0 {
            return invalid("gallery.item_count must be at least 1".into());
        }
        if !(self.scroll.max_progress > 1.0) {
            return invalid(format!(
                "scroll.max_progress must exceed 1.0 (got {})",
                self.scroll.max_progress
            ));
        }
        for (name, value) in [
            ("scroll.wheel_sensitivity", self.scroll.wheel_sensitivity),
            ("scroll.touch_sensitivity", self.scroll.touch_sensitivity),
            ("scroll.active_lerp_speed", self.scroll.active_lerp_speed),
            ("scroll.idle_lerp_speed", self.scroll.idle_lerp_speed),
            ("scroll.settle_epsilon", self.scroll.settle_epsilon),
            ("snap.exit_gesture_threshold", self.snap.exit_gesture_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{} must be a non-negative number (got {})", name, value));
            }
        }
        for (name, value) in [
            ("snap.elastic_strength", self.snap.elastic_strength),
            ("snap.snap_speed", self.snap.snap_speed),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return invalid(format!("{} must be in (0, 1] (got {})", name, value));
            }
        }
        let snap = &self.snap;
        if !(1.0 < snap.commit_threshold
            && snap.commit_threshold < snap.engaged_threshold
            && snap.engaged_threshold <= self.scroll.max_progress)
        {
            return invalid(format!(
                "thresholds must satisfy 1.0 < commit ({}) < engaged ({}) <= max_progress ({})",
                snap.commit_threshold, snap.engaged_threshold, self.scroll.max_progress
            ));
        }
        if !(0.0 <= snap.snap_lower && snap.snap_lower <= 0.5 && 0.5 <= snap.snap_upper && snap.snap_upper <= 1.0) {
            return invalid(format!(
                "snap window must satisfy 0 <= lower ({}) <= 0.5 <= upper ({}) <= 1",
                snap.snap_lower, snap.snap_upper
            ));
        }
        if !(1.0 < snap.exit_rebound_target && snap.exit_rebound_target <= self.scroll.max_progress) {
            return invalid(format!(
                "snap.exit_rebound_target must be in (1.0, max_progress] (got {})",
                snap.exit_rebound_target
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/plinth/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("plinth")
            .join("config.toml")
    }

    /// Get the navigation snapshot file path
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join(&self.snapshot.file_name)
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.gallery.item_count, 5);
        assert_eq!(config.scroll.wheel_sensitivity, 0.0008);
        assert_eq!(config.scroll.touch_sensitivity, 0.003);
        assert_eq!(config.scroll.idle_timeout(), Duration::from_millis(150));
        assert_eq!(config.snap.commit_threshold, 1.1);
        assert_eq!(config.snap.engaged_threshold, 1.3);
        assert_eq!(config.snap.exit_rebound_target, 1.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [gallery]
            item_count = 3

            [snap]
            snap_speed = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.gallery.item_count, 3);
        assert_eq!(config.snap.snap_speed, 0.1);
        assert_eq!(config.snap.elastic_strength, 0.08);
        assert_eq!(config.sections.works_anchor, "works");
    }

    #[test]
    fn test_rejects_empty_gallery() {
        let err = AppConfig::from_toml("[gallery]\nitem_count = 0\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_rejects_collapsed_thresholds() {
        let mut config = AppConfig::default();
        config.snap.commit_threshold = 1.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_item_span() {
        let mut gallery = GalleryConfig::default();
        assert_eq!(gallery.item_span(), 0.25);
        gallery.item_count = 1;
        assert_eq!(gallery.item_span(), 0.0);
        assert_eq!(gallery.last_index(), 0);
    }

    #[test]
    fn test_toml_round_trip_keeps_values() {
        let mut config = AppConfig::default();
        config.gallery.item_count = 7;
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.gallery.item_count, 7);
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        let path = PathBuf::from("/var/lib/plinth");
        assert_eq!(expand_tilde(&path), path);
    }
}
