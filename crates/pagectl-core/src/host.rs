//! The seam between the controller and whatever renders the page.

use crate::action::Effect;
use crate::error::Result;

/// Environment the controller runs against.
///
/// The browser implementation lives in `pagectl-web`; tests use
/// [`RecordingHost`](crate::testing::RecordingHost). Every method may fail;
/// the controller treats failures as non-fatal and logs them.
pub trait PageHost {
    /// Read a persisted preference.
    fn load_preference(&self, key: &str) -> Result<Option<String>>;

    /// Persist a preference.
    fn store_preference(&mut self, key: &str, value: &str) -> Result<()>;

    /// Whether any element in the document matches `selector`.
    fn selector_matches(&self, selector: &str) -> Result<bool>;

    /// Apply one effect to the page.
    fn apply(&mut self, effect: Effect) -> Result<()>;
}

impl<H: PageHost + ?Sized> PageHost for Box<H> {
    fn load_preference(&self, key: &str) -> Result<Option<String>> {
        (**self).load_preference(key)
    }

    fn store_preference(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).store_preference(key, value)
    }

    fn selector_matches(&self, selector: &str) -> Result<bool> {
        (**self).selector_matches(selector)
    }

    fn apply(&mut self, effect: Effect) -> Result<()> {
        (**self).apply(effect)
    }
}

/// Which page elements exist, probed once at startup.
///
/// Each behavior is enabled only when the elements it needs are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInventory {
    /// Theme toggle control and its icon.
    pub theme_toggle: bool,
    /// Slides inside the slider track (0 when the track is missing).
    pub slide_count: usize,
    pub dot_count: usize,
    /// Background audio element.
    pub audio: bool,
    pub bubble_container: bool,
    pub scroll_button: bool,
    /// Menu toggle and menu panel.
    pub mobile_menu: bool,
    /// Images carrying a deferred source.
    pub lazy_image_count: usize,
}

impl PageInventory {
    /// Inventory of a page carrying every element.
    #[must_use]
    pub const fn full(slide_count: usize, lazy_image_count: usize) -> Self {
        Self {
            theme_toggle: true,
            slide_count,
            dot_count: slide_count,
            audio: true,
            bubble_container: true,
            scroll_button: true,
            mobile_menu: true,
            lazy_image_count,
        }
    }
}
