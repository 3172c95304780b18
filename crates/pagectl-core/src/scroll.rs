//! Scroll-to-section button.

use crate::action::Effect;
use crate::host::PageHost;

/// Pick the scroll effect for a button press: the first selector with a
/// match scrolls into view; otherwise the window scrolls down by
/// `fallback_offset` pixels. Selector lookups that fail count as no match.
pub fn resolve_scroll<H: PageHost + ?Sized>(
    host: &H,
    selectors: &[String],
    fallback_offset: f64,
) -> Effect {
    let target = selectors.iter().find(|selector| {
        host.selector_matches(selector).unwrap_or_else(|err| {
            tracing::warn!(
                target: "pagectl.scroll",
                selector = %selector,
                error = %err,
                "section lookup failed"
            );
            false
        })
    });
    match target {
        Some(selector) => Effect::ScrollIntoView {
            selector: selector.clone(),
        },
        None => Effect::ScrollBy {
            top: fallback_offset,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::testing::RecordingHost;

    #[test]
    fn first_matching_selector_wins() {
        let host = RecordingHost::new()
            .with_selector("#gallery")
            .with_selector(".gallery-section");
        let config = PageConfig::default();
        assert_eq!(
            resolve_scroll(&host, &config.scroll_targets, 500.0),
            Effect::ScrollIntoView {
                selector: ".gallery-section".into()
            }
        );
    }

    #[test]
    fn no_match_falls_back_to_fixed_offset() {
        let host = RecordingHost::new();
        let config = PageConfig::default();
        assert_eq!(
            resolve_scroll(&host, &config.scroll_targets, 500.0),
            Effect::ScrollBy { top: 500.0 }
        );
    }

    #[test]
    fn failing_lookup_is_skipped() {
        let host = RecordingHost::new()
            .with_selector("#gallery")
            .with_broken_selector(".photo-section");
        let config = PageConfig::default();
        assert_eq!(
            resolve_scroll(&host, &config.scroll_targets, 500.0),
            Effect::ScrollIntoView {
                selector: "#gallery".into()
            }
        );
    }
}
