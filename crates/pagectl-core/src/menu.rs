//! Mobile navigation toggle.

use crate::action::Effect;

/// Icon-font class on the menu toggle for the given open state.
#[must_use]
pub const fn menu_icon_class(open: bool) -> &'static str {
    if open { "fa-times" } else { "fa-bars" }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> Effect {
        self.open = !self.open;
        Effect::SetMenuOpen(self.open)
    }

    /// A click landed somewhere in the document. Clicks outside both the
    /// toggle and the panel close an open menu.
    pub fn document_clicked(&mut self, inside_menu: bool) -> Option<Effect> {
        if inside_menu || !self.open {
            return None;
        }
        self.open = false;
        Some(Effect::SetMenuOpen(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_state() {
        let mut menu = MobileMenu::default();
        assert_eq!(menu.toggle(), Effect::SetMenuOpen(true));
        assert_eq!(menu.toggle(), Effect::SetMenuOpen(false));
    }

    #[test]
    fn outside_click_closes() {
        let mut menu = MobileMenu::default();
        menu.toggle();
        assert_eq!(menu.document_clicked(false), Some(Effect::SetMenuOpen(false)));
        assert!(!menu.is_open());
    }

    #[test]
    fn inside_click_keeps_menu_open() {
        let mut menu = MobileMenu::default();
        menu.toggle();
        assert_eq!(menu.document_clicked(true), None);
        assert!(menu.is_open());
    }

    #[test]
    fn icon_tracks_state() {
        assert_eq!(menu_icon_class(true), "fa-times");
        assert_eq!(menu_icon_class(false), "fa-bars");
    }
}
