//! Element identifiers, selectors and class names the page markup uses,
//! plus the small string conversions between controller values and DOM
//! attributes.

/// Element ids looked up with `getElementById`.
pub mod ids {
    pub const THEME_TOGGLE: &str = "theme-toggle";
    pub const SLIDER: &str = "slider";
    pub const PREV_SLIDE: &str = "prev-slide";
    pub const NEXT_SLIDE: &str = "next-slide";
    pub const AUDIO: &str = "bg-audio";
    pub const PLAY_PAUSE: &str = "play-pause";
    pub const PLAY_ICON: &str = "play-icon";
    /// Filled part of the progress track.
    pub const PROGRESS: &str = "progress";
    /// Clickable progress track.
    pub const PROGRESS_BAR: &str = "progress-bar";
    pub const HERO_PLAY: &str = "play-music-btn";
    pub const VOLUME_SLIDER: &str = "volume-slider";
    pub const CLOSE_PLAYER: &str = "close-player";
    pub const MUSIC_PLAYER: &str = "music-player";
    pub const CURRENT_TIME: &str = "current-time";
    pub const DURATION: &str = "duration";
    pub const BUBBLE_CONTAINER: &str = "bubble-container";
    pub const SCROLL_BUTTON: &str = "scroll-btn";
    pub const MENU_TOGGLE: &str = "menu-toggle";
    pub const MOBILE_MENU: &str = "mobile-menu";
    pub const CONFIG: &str = "pagectl-config";
}

pub const SLIDE_SELECTOR: &str = ".slide";
pub const DOT_SELECTOR: &str = ".dot";
pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";
/// Icon nested inside the theme and menu toggles.
pub const ICON_SELECTOR: &str = "i";

pub const DATA_SRC: &str = "data-src";
pub const ARIA_CURRENT: &str = "aria-current";
pub const ARIA_HIDDEN: &str = "aria-hidden";

pub const ACTIVE_CLASS: &str = "active";
pub const BUBBLE_CLASS: &str = "floating-bubble";

/// `style.width` value for a progress percentage.
#[must_use]
pub fn percent_width(percent: f64) -> String {
    format!("{percent}%")
}

/// `style.display` value for the music player panel.
#[must_use]
pub const fn player_display(visible: bool) -> &'static str {
    if visible { "block" } else { "none" }
}

/// Parse the volume slider's string value.
#[must_use]
pub fn parse_volume(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Offset of a click inside a track, from viewport coordinates.
#[must_use]
pub fn click_offset(client_x: i32, track_left: f64) -> f64 {
    f64::from(client_x) - track_left
}
