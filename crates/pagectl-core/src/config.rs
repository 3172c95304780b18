//! Tunable page behavior parameters.
//!
//! Every field defaults to the value the page has always shipped with, so
//! `PageConfig::default()` reproduces the stock behavior. Pages may override
//! any subset through a JSON block:
//!
//! ```json
//! { "auto_slide_interval_ms": 8000, "theme_storage_key": "site_theme" }
//! ```
//!
//! ```
//! use pagectl_core::PageConfig;
//!
//! let config = PageConfig::from_json_str(r#"{ "auto_slide_interval_ms": 8000 }"#).unwrap();
//! assert_eq!(config.auto_slide_interval_ms, 8000);
//! assert_eq!(config.bubble_interval_ms, 2000);
//! ```

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::ConfigError;

/// Emoji palette used for decorative bubbles.
pub const DEFAULT_BUBBLE_EMOJIS: [&str; 14] = [
    "🤝", "🫶", "✨", "🎵", "🍜", "🥤", "🤙", "🏠", "❤️", "👋", "💫", "⭐", "🔥", "💯",
];

/// Section selectors tried, in order, by the scroll button.
pub const DEFAULT_SCROLL_TARGETS: [&str; 5] = [
    ".photo-section",
    "#photo-section",
    ".gallery-section",
    "#gallery",
    "section:nth-of-type(2)",
];

pub const DEFAULT_THEME_STORAGE_KEY: &str = "kelzz_theme";
pub const DEFAULT_PLAYBACK_BLOCKED_MESSAGE: &str =
    "Klik tombol play di player untuk memulai musik";

/// Top-level configuration for [`PageController`](crate::PageController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Slider auto-advance period.
    pub auto_slide_interval_ms: u64,
    /// Period between spawned bubbles.
    pub bubble_interval_ms: u64,
    /// Time a bubble stays in the document.
    pub bubble_lifetime_ms: u64,
    /// Bubbles front-loaded at startup.
    pub initial_bubbles: u32,
    /// Offset between front-loaded bubbles.
    pub initial_bubble_stagger_ms: u64,
    /// Audio volume applied before the first play.
    pub default_volume: f64,
    /// Storage key holding the theme preference.
    pub theme_storage_key: String,
    pub scroll_targets: Vec<String>,
    /// Window scroll distance used when no section matches.
    pub scroll_fallback_offset_px: f64,
    pub bubble_emojis: Vec<String>,
    /// Blocking notification shown when the browser refuses to start audio.
    pub playback_blocked_message: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            auto_slide_interval_ms: 5000,
            bubble_interval_ms: 2000,
            bubble_lifetime_ms: 10_000,
            initial_bubbles: 5,
            initial_bubble_stagger_ms: 300,
            default_volume: 0.5,
            theme_storage_key: DEFAULT_THEME_STORAGE_KEY.to_string(),
            scroll_targets: DEFAULT_SCROLL_TARGETS.iter().map(|s| s.to_string()).collect(),
            scroll_fallback_offset_px: 500.0,
            bubble_emojis: DEFAULT_BUBBLE_EMOJIS.iter().map(|s| s.to_string()).collect(),
            playback_blocked_message: DEFAULT_PLAYBACK_BLOCKED_MESSAGE.to_string(),
        }
    }
}

impl PageConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("auto_slide_interval_ms", self.auto_slide_interval_ms),
            ("bubble_interval_ms", self.bubble_interval_ms),
            ("bubble_lifetime_ms", self.bubble_lifetime_ms),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(ConfigError::VolumeOutOfRange {
                value: self.default_volume,
            });
        }
        if self.bubble_emojis.is_empty() {
            return Err(ConfigError::EmptyEmojiPalette);
        }
        Ok(())
    }

    #[must_use]
    pub fn auto_slide_interval(&self) -> Duration {
        Duration::from_millis(self.auto_slide_interval_ms)
    }

    #[must_use]
    pub fn bubble_interval(&self) -> Duration {
        Duration::from_millis(self.bubble_interval_ms)
    }

    #[must_use]
    pub fn bubble_lifetime(&self) -> Duration {
        Duration::from_millis(self.bubble_lifetime_ms)
    }

    #[must_use]
    pub fn initial_bubble_stagger(&self) -> Duration {
        Duration::from_millis(self.initial_bubble_stagger_ms)
    }
}
