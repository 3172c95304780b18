//! Decorative floating emoji.
//!
//! Bubbles are fire-and-forget: each spawn gets a removal timer for the
//! configured lifetime, independent of its CSS animation. There is no cap on
//! live bubbles; their number is bounded only by lifetime / interval.

use std::collections::BTreeSet;

use rand::Rng;

use crate::action::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(u64);

impl BubbleId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Randomized presentation of one bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleSpec {
    pub emoji: String,
    /// Horizontal position, `[0, 100)` percent of the container.
    pub left_percent: f64,
    /// Font size, `[1, 2.5)` rem.
    pub font_size_rem: f64,
    /// Float animation length, `[5, 10)` seconds.
    pub animation_secs: f64,
    /// `[0.3, 0.8)`.
    pub opacity: f64,
}

impl BubbleSpec {
    /// Draw a spec from `rng`. `palette` must not be empty.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, palette: &[String]) -> Self {
        let emoji = palette[rng.random_range(0..palette.len())].clone();
        Self {
            emoji,
            left_percent: rng.random::<f64>() * 100.0,
            font_size_rem: rng.random::<f64>() * 1.5 + 1.0,
            animation_secs: rng.random::<f64>() * 5.0 + 5.0,
            opacity: rng.random::<f64>() * 0.5 + 0.3,
        }
    }

    /// Inline style declarations for the bubble node.
    #[must_use]
    pub fn style_properties(&self) -> [(&'static str, String); 4] {
        [
            ("left", format!("{}%", self.left_percent)),
            ("font-size", format!("{}rem", self.font_size_rem)),
            ("animation-duration", format!("{}s", self.animation_secs)),
            ("opacity", self.opacity.to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BubbleSpawner {
    palette: Vec<String>,
    live: BTreeSet<BubbleId>,
    next_id: u64,
}

impl BubbleSpawner {
    #[must_use]
    pub fn new(palette: Vec<String>) -> Self {
        Self {
            palette,
            live: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Create one bubble. Returns its id (for the removal timer) and the
    /// spawn effect, or `None` with an empty palette.
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(BubbleId, Effect)> {
        if self.palette.is_empty() {
            tracing::warn!(target: "pagectl.bubbles", "empty emoji palette; not spawning");
            return None;
        }
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        let spec = BubbleSpec::random(rng, &self.palette);
        self.live.insert(id);
        Some((id, Effect::SpawnBubble { id, spec }))
    }

    /// Retire a bubble. Unknown or already removed ids yield nothing.
    pub fn remove(&mut self, id: BubbleId) -> Option<Effect> {
        self.live.remove(&id).then_some(Effect::RemoveBubble(id))
    }

    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_live(&self, id: BubbleId) -> bool {
        self.live.contains(&id)
    }

    /// Total bubbles spawned so far.
    #[must_use]
    pub const fn spawned(&self) -> u64 {
        self.next_id
    }
}
