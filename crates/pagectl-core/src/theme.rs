//! Light/dark theme flag and its persistence.

use std::fmt;

use crate::action::Effect;
use crate::host::PageHost;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored preference. Anything but the two known values is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Class set on `<body>` while this theme is active.
    #[must_use]
    pub const fn body_class(self) -> &'static str {
        match self {
            Self::Light => "light-mode",
            Self::Dark => "dark-mode",
        }
    }

    /// Toggle icon: the moon invites switching to dark, the sun back to light.
    #[must_use]
    pub const fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fa-moon",
            Self::Dark => "fa-sun",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme toggle behavior.
#[derive(Debug, Clone)]
pub struct ThemeToggle {
    key: String,
    current: Theme,
}

impl ThemeToggle {
    /// Read the saved preference, falling back to [`Theme::Light`].
    pub fn load<H: PageHost + ?Sized>(host: &H, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match host.load_preference(&key) {
            Ok(Some(saved)) => Theme::parse(&saved).unwrap_or_else(|| {
                tracing::debug!(target: "pagectl.theme", saved = %saved, "ignoring unknown theme preference");
                Theme::Light
            }),
            Ok(None) => Theme::Light,
            Err(err) => {
                tracing::warn!(target: "pagectl.theme", error = %err, "theme preference unreadable");
                Theme::Light
            }
        };
        Self { key, current }
    }

    #[must_use]
    pub const fn current(&self) -> Theme {
        self.current
    }

    #[must_use]
    pub fn effect(&self) -> Effect {
        Effect::ApplyTheme(self.current)
    }

    /// Flip the theme and persist it. A failed write is logged; the displayed
    /// theme still changes.
    pub fn toggle<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Effect {
        self.current = self.current.toggled();
        if let Err(err) = host.store_preference(&self.key, self.current.as_str()) {
            tracing::warn!(target: "pagectl.theme", error = %err, "theme preference not saved");
        }
        self.effect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    #[test]
    fn parse_accepts_only_known_values() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("Dark"), None);
        assert_eq!(Theme::parse(""), None);
    }

    #[test]
    fn light_mode_shows_moon_icon() {
        assert_eq!(Theme::Light.icon_class(), "fa-moon");
        assert_eq!(Theme::Dark.icon_class(), "fa-sun");
        assert_eq!(Theme::Dark.body_class(), "dark-mode");
    }

    #[test]
    fn invalid_saved_value_falls_back_to_light() {
        let host = RecordingHost::new().with_preference("kelzz_theme", "sepia");
        assert_eq!(ThemeToggle::load(&host, "kelzz_theme").current(), Theme::Light);
    }

    #[test]
    fn toggle_persists_new_value() {
        let mut host = RecordingHost::new();
        let mut toggle = ThemeToggle::load(&host, "kelzz_theme");
        assert_eq!(toggle.toggle(&mut host), Effect::ApplyTheme(Theme::Dark));
        assert_eq!(host.preference("kelzz_theme"), Some("dark"));
    }

    #[test]
    fn unreadable_storage_defaults_to_light() {
        let mut host = RecordingHost::new().with_preference("kelzz_theme", "dark");
        host.fail_storage(true);
        assert_eq!(ThemeToggle::load(&host, "kelzz_theme").current(), Theme::Light);
    }
}
