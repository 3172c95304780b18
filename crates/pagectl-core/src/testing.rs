//! In-memory [`PageHost`] for tests.

use std::collections::{HashMap, HashSet};

use crate::action::Effect;
use crate::error::{PageError, Result};
use crate::host::PageHost;

/// Records every applied effect and keeps preferences in a map.
#[derive(Debug, Default)]
pub struct RecordingHost {
    preferences: HashMap<String, String>,
    selectors: HashSet<String>,
    broken_selectors: HashSet<String>,
    effects: Vec<Effect>,
    storage_fails: bool,
    apply_fails: bool,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_preference(mut self, key: &str, value: &str) -> Self {
        self.preferences.insert(key.to_string(), value.to_string());
        self
    }

    /// Make `selector` match an element.
    #[must_use]
    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selectors.insert(selector.to_string());
        self
    }

    /// Make lookups of `selector` fail.
    #[must_use]
    pub fn with_broken_selector(mut self, selector: &str) -> Self {
        self.broken_selectors.insert(selector.to_string());
        self
    }

    pub fn fail_storage(&mut self, fail: bool) {
        self.storage_fails = fail;
    }

    /// Make every `apply` call fail (effects are still recorded).
    pub fn fail_apply(&mut self, fail: bool) {
        self.apply_fails = fail;
    }

    #[must_use]
    pub fn preference(&self, key: &str) -> Option<&str> {
        self.preferences.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

impl PageHost for RecordingHost {
    fn load_preference(&self, key: &str) -> Result<Option<String>> {
        if self.storage_fails {
            return Err(PageError::storage("storage disabled"));
        }
        Ok(self.preferences.get(key).cloned())
    }

    fn store_preference(&mut self, key: &str, value: &str) -> Result<()> {
        if self.storage_fails {
            return Err(PageError::storage("quota exceeded"));
        }
        self.preferences.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn selector_matches(&self, selector: &str) -> Result<bool> {
        if self.broken_selectors.contains(selector) {
            return Err(PageError::Selector {
                selector: selector.to_string(),
            });
        }
        Ok(self.selectors.contains(selector))
    }

    fn apply(&mut self, effect: Effect) -> Result<()> {
        self.effects.push(effect);
        if self.apply_fails {
            return Err(PageError::host("apply", "detached element"));
        }
        Ok(())
    }
}
