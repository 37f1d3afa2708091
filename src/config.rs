//! Registry configuration model, defaults, and validation.

use serde::{Deserialize, Serialize};

/// Selection behavior and capacity settings for one registry session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Maximum number of simultaneously displayed items. Must be above zero.
    #[serde(default = "default_max_displayed_items")]
    pub max_displayed_items: usize,
    /// Time a hidden item stays out of rotation, in milliseconds, measured
    /// from the moment it was last shown.
    #[serde(default = "default_rotation_cooldown_ms")]
    pub rotation_cooldown_ms: u64,
    /// When off, selection is a uniform random pick.
    #[serde(default = "default_true")]
    pub enable_weighted_selection: bool,
    /// When off, an exhausted pool yields no content instead of reclaiming
    /// the longest-displayed item.
    #[serde(default = "default_true")]
    pub enable_rotation_strategy: bool,
    #[serde(default)]
    pub weights: SelectionWeights,
}

/// Weighting coefficients for the selection score.
///
/// The coefficients need not sum to 1; each must be finite and
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SelectionWeights {
    #[serde(default = "default_recency_weight")]
    pub recency: f64,
    #[serde(default = "default_popularity_weight")]
    pub popularity: f64,
    #[serde(default = "default_type_balance_weight")]
    pub type_balance: f64,
    #[serde(default = "default_random_weight")]
    pub random: f64,
}

/// Partial configuration update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfigUpdate {
    pub max_displayed_items: Option<usize>,
    pub rotation_cooldown_ms: Option<u64>,
    pub enable_weighted_selection: Option<bool>,
    pub enable_rotation_strategy: Option<bool>,
    pub weights: Option<SelectionWeights>,
}

/// Configuration values rejected at construction or update time.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_displayed_items must be greater than zero")]
    ZeroCapacity,
    #[error("selection weight '{name}' must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_displayed_items: default_max_displayed_items(),
            rotation_cooldown_ms: default_rotation_cooldown_ms(),
            enable_weighted_selection: true,
            enable_rotation_strategy: true,
            weights: SelectionWeights::default(),
        }
    }
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            recency: default_recency_weight(),
            popularity: default_popularity_weight(),
            type_balance: default_type_balance_weight(),
            random: default_random_weight(),
        }
    }
}

impl RegistryConfig {
    /// Rejects capacities and weights that would produce undefined scoring.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_displayed_items == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.weights.validate()
    }

    /// Returns a copy with the update's present fields applied.
    pub fn apply_update(&self, update: &RegistryConfigUpdate) -> RegistryConfig {
        let mut next = self.clone();
        if let Some(max_displayed_items) = update.max_displayed_items {
            next.max_displayed_items = max_displayed_items;
        }
        if let Some(rotation_cooldown_ms) = update.rotation_cooldown_ms {
            next.rotation_cooldown_ms = rotation_cooldown_ms;
        }
        if let Some(enable_weighted_selection) = update.enable_weighted_selection {
            next.enable_weighted_selection = enable_weighted_selection;
        }
        if let Some(enable_rotation_strategy) = update.enable_rotation_strategy {
            next.enable_rotation_strategy = enable_rotation_strategy;
        }
        if let Some(weights) = update.weights {
            next.weights = weights;
        }
        next
    }
}

impl SelectionWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("recency", self.recency),
            ("popularity", self.popularity),
            ("type_balance", self.type_balance),
            ("random", self.random),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_max_displayed_items() -> usize {
    15
}

fn default_rotation_cooldown_ms() -> u64 {
    30_000
}

fn default_recency_weight() -> f64 {
    0.35
}

fn default_popularity_weight() -> f64 {
    0.25
}

fn default_type_balance_weight() -> f64 {
    0.2
}

fn default_random_weight() -> f64 {
    0.2
}
