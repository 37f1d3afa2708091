//! Selection scoring and sampling over the available set.
//!
//! Scoring functions are pure; the random component of a weight is drawn by
//! the caller and passed in, which keeps the weight formula testable in
//! isolation from the pool and the RNG.

use rand::{rngs::StdRng, RngExt, SeedableRng};

use crate::config::{RegistryConfig, SelectionWeights};
use crate::content::{ContentItem, ContentType, TypeCounts};

/// Log base of the popularity curve. A related count of 19 scores exactly
/// 1.0; the score keeps growing past 1.0 for very popular items.
const POPULARITY_LOG_BASE: f64 = 20.0;

/// Recency recovery score in [0, 1]. Never-displayed items score 1.0, and a
/// zero cooldown means items recover instantly.
pub fn recency_score(item: &ContentItem, now_ms: u64, cooldown_ms: u64) -> f64 {
    let Some(last_displayed_ms) = item.last_displayed_ms else {
        return 1.0;
    };
    if cooldown_ms == 0 {
        return 1.0;
    }
    let elapsed_ms = now_ms.saturating_sub(last_displayed_ms) as f64;
    (elapsed_ms / cooldown_ms as f64).min(1.0)
}

/// Logarithmic popularity score: 0.0 at zero related entries, 1.0 at 19.
pub fn popularity_score(related_count: u32) -> f64 {
    (f64::from(related_count) + 1.0).ln() / POPULARITY_LOG_BASE.ln()
}

/// Category balance score; categories under-represented among displayed
/// entries score higher. The observed ratio is defined as 1.0 when nothing
/// is displayed, so an empty screen biases no category over another.
pub fn type_balance_score(content_type: ContentType, displayed: &TypeCounts) -> f64 {
    let total = displayed.total();
    let observed_ratio = if total == 0 {
        1.0
    } else {
        displayed.count(content_type) as f64 / total as f64
    };
    (1.0 - (observed_ratio - 1.0 / 3.0).abs()).max(0.0)
}

/// Combined selection weight, clamped non-negative.
///
/// `random_draw` must be a fresh per-candidate draw in [0, 1); reusing a
/// draw across candidates would bias repeated selections the same way.
pub fn selection_weight(
    item: &ContentItem,
    now_ms: u64,
    cooldown_ms: u64,
    displayed: &TypeCounts,
    weights: &SelectionWeights,
    random_draw: f64,
) -> f64 {
    let weight = recency_score(item, now_ms, cooldown_ms) * weights.recency
        + popularity_score(item.related_count) * weights.popularity
        + type_balance_score(item.content_type, displayed) * weights.type_balance
        + random_draw * weights.random;
    weight.max(0.0)
}

/// Random choice over available candidates, uniform or weighted.
pub struct Selector {
    rng: StdRng,
}

impl Selector {
    /// Creates a selector seeded from the operating system RNG.
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed).expect("Failed to generate random seed");
        Self {
            rng: StdRng::from_seed(seed),
        }
    }

    /// Creates a selector with a fixed seed for reproducible selection.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: StdRng::from_seed(seed),
        }
    }

    /// Picks the next item from `candidates`.
    ///
    /// Weighted sampling draws `r` in `[0, total)` and walks the list
    /// subtracting weights until the remainder reaches zero. An all-zero
    /// weight total falls back to a uniform pick. Returns `None` only for
    /// an empty candidate list; the empty-pool boundary belongs to the
    /// rotation controller.
    pub fn select_next<'a>(
        &mut self,
        candidates: &[&'a ContentItem],
        displayed: &TypeCounts,
        config: &RegistryConfig,
        now_ms: u64,
    ) -> Option<&'a ContentItem> {
        if candidates.is_empty() {
            return None;
        }
        if !config.enable_weighted_selection {
            return self.uniform_pick(candidates);
        }

        let weights: Vec<f64> = candidates
            .iter()
            .map(|item| {
                let draw = self.rng.random::<f64>();
                selection_weight(
                    item,
                    now_ms,
                    config.rotation_cooldown_ms,
                    displayed,
                    &config.weights,
                    draw,
                )
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return self.uniform_pick(candidates);
        }

        let mut remainder = self.rng.random::<f64>() * total;
        for (item, weight) in candidates.iter().zip(&weights) {
            remainder -= weight;
            if remainder <= 0.0 {
                return Some(*item);
            }
        }
        // Floating-point residue can leave a sliver past the last weight.
        candidates.last().copied()
    }

    fn uniform_pick<'a>(&mut self, candidates: &[&'a ContentItem]) -> Option<&'a ContentItem> {
        let index = self.rng.random_range(0..candidates.len());
        candidates.get(index).copied()
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}
