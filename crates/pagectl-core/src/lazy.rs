//! One-shot lazy image loading.

use std::collections::BTreeSet;

use crate::action::Effect;

/// Images still waiting for their real source, by document order.
#[derive(Debug, Clone, Default)]
pub struct LazyImages {
    pending: BTreeSet<usize>,
}

impl LazyImages {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            pending: (0..count).collect(),
        }
    }

    /// Observation request, if there is anything to observe.
    #[must_use]
    pub fn init(&self) -> Option<Effect> {
        (!self.pending.is_empty()).then_some(Effect::ObserveLazyImages)
    }

    /// Image `index` entered the viewport. Each image loads at most once.
    pub fn intersected(&mut self, index: usize) -> Option<Effect> {
        self.pending.remove(&index).then_some(Effect::LoadImage(index))
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
