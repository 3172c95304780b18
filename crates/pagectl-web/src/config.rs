//! Page configuration embedded in the document.
//!
//! A page may carry `<script type="application/json" id="pagectl-config">`
//! with any subset of [`PageConfig`] fields. Missing or broken blocks fall
//! back to the defaults; the page always starts.

use pagectl_core::PageConfig;

/// Resolve the effective configuration from the raw block contents.
#[must_use]
pub fn resolve_config(raw: Option<&str>) -> PageConfig {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        tracing::debug!(target: "pagectl.web", "no config block; using defaults");
        return PageConfig::default();
    };
    match PageConfig::from_json_str(raw) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(target: "pagectl.web", error = %err, "config block rejected; using defaults");
            PageConfig::default()
        }
    }
}

/// Serialize the effective configuration for inspection from JS.
pub fn config_json(config: &PageConfig) -> serde_json::Result<String> {
    serde_json::to_string(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_or_blank_block_uses_defaults() {
        assert_eq!(resolve_config(None), PageConfig::default());
        assert_eq!(resolve_config(Some("  \n ")), PageConfig::default());
    }

    #[test]
    fn partial_block_overrides_named_fields() {
        let config = resolve_config(Some(r#"{"auto_slide_interval_ms": 8000, "default_volume": 0.2}"#));
        assert_eq!(config.auto_slide_interval_ms, 8000);
        assert_eq!(config.default_volume, 0.2);
        assert_eq!(config.bubble_interval_ms, PageConfig::default().bubble_interval_ms);
    }

    #[test]
    fn malformed_or_invalid_block_falls_back() {
        assert_eq!(resolve_config(Some("{not json")), PageConfig::default());
        assert_eq!(
            resolve_config(Some(r#"{"bubble_interval_ms": 0}"#)),
            PageConfig::default()
        );
    }

    #[test]
    fn effective_config_serializes() {
        let json = config_json(&PageConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["theme_storage_key"], "kelzz_theme");
        assert_eq!(value["auto_slide_interval_ms"], 5000);
    }
}
