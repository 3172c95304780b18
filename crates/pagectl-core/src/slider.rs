//! Cyclic image carousel state machine.
//!
//! The slider holds an index in `[0, count)`. Manual navigation and the
//! periodic auto-advance both go through [`Slider::apply`]; the controller
//! owns the auto-advance timer and restarts it after every manual move, so
//! an automatic step never lands within one full interval of user input.

use crate::action::Effect;

/// One slider transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideNav {
    Next,
    Prev,
    Jump(usize),
    /// Periodic timer step; behaves like `Next` but does not count as input.
    Auto,
}

impl SlideNav {
    /// Whether this transition came from the user.
    #[must_use]
    pub const fn is_manual(self) -> bool {
        !matches!(self, Self::Auto)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slider {
    index: usize,
    count: usize,
}

impl Slider {
    /// A slider over `count` slides, starting at the first one.
    ///
    /// Returns `None` for an empty track.
    #[must_use]
    pub fn new(count: usize) -> Option<Self> {
        (count > 0).then_some(Self { index: 0, count })
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn effect(&self) -> Effect {
        Effect::ShowSlide {
            index: self.index,
            count: self.count,
        }
    }

    /// Apply a transition. Out-of-range jumps leave the index unchanged and
    /// return `None`.
    pub fn apply(&mut self, nav: SlideNav) -> Option<Effect> {
        self.index = match nav {
            SlideNav::Next | SlideNav::Auto => (self.index + 1) % self.count,
            SlideNav::Prev => (self.index + self.count - 1) % self.count,
            SlideNav::Jump(target) if target < self.count => target,
            SlideNav::Jump(target) => {
                tracing::warn!(
                    target: "pagectl.slider",
                    index = target,
                    count = self.count,
                    "ignoring jump past the last slide"
                );
                return None;
            }
        };
        Some(self.effect())
    }
}

/// CSS transform placing slide `index` in view.
#[must_use]
pub fn track_transform(index: usize) -> String {
    format!("translateX(-{}%)", index * 100)
}

/// Active marker per navigation dot: only the dot at `index` is set.
///
/// Pages may carry fewer dots than slides; extra slides simply have no dot.
#[must_use]
pub fn dot_markers(index: usize, dot_count: usize) -> Vec<bool> {
    (0..dot_count).map(|dot| dot == index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_current_dot_is_marked() {
        assert_eq!(dot_markers(2, 3), vec![false, false, true]);
        assert_eq!(dot_markers(4, 3), vec![false, false, false]);
    }

    #[test]
    fn empty_track_has_no_slider() {
        assert!(Slider::new(0).is_none());
    }

    #[test]
    fn prev_from_first_wraps_to_last() {
        let mut slider = Slider::new(4).unwrap();
        slider.apply(SlideNav::Prev);
        assert_eq!(slider.index(), 3);
    }

    #[test]
    fn next_from_last_wraps_to_first() {
        let mut slider = Slider::new(3).unwrap();
        slider.apply(SlideNav::Jump(2));
        slider.apply(SlideNav::Next);
        assert_eq!(slider.index(), 0);
    }

    #[test]
    fn single_slide_stays_put() {
        let mut slider = Slider::new(1).unwrap();
        slider.apply(SlideNav::Next);
        slider.apply(SlideNav::Prev);
        assert_eq!(slider.index(), 0);
    }

    #[test]
    fn out_of_range_jump_is_ignored() {
        let mut slider = Slider::new(3).unwrap();
        slider.apply(SlideNav::Next);
        assert_eq!(slider.apply(SlideNav::Jump(3)), None);
        assert_eq!(slider.index(), 1);
    }

    #[test]
    fn apply_reports_new_position() {
        let mut slider = Slider::new(3).unwrap();
        assert_eq!(
            slider.apply(SlideNav::Jump(2)),
            Some(Effect::ShowSlide { index: 2, count: 3 })
        );
    }

    #[test]
    fn transform_shifts_by_whole_slides() {
        assert_eq!(track_transform(0), "translateX(-0%)");
        assert_eq!(track_transform(2), "translateX(-200%)");
    }

    #[test]
    fn only_auto_is_not_manual() {
        assert!(SlideNav::Next.is_manual());
        assert!(SlideNav::Jump(0).is_manual());
        assert!(!SlideNav::Auto.is_manual());
    }
}
