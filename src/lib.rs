//! Content selection and duplicate prevention for a music-metadata bubble
//! visualization.
//!
//! The registry decides which catalog content (songs, contributors, tags)
//! may be surfaced next, guarantees that no two simultaneously visible
//! bubbles represent the same content, biases selection by recency,
//! popularity, and category balance, and reclaims stale occupancies when
//! every display slot is taken. Rendering, motion, and bubble lifetimes
//! belong to the embedding presentation layer; the registry only answers
//! "what may be shown now".

pub mod catalog;
pub mod clock;
pub mod config;
pub mod content;
pub mod content_pool;
pub mod content_registry;
pub mod rotation;
pub mod selector;

pub use catalog::CatalogInput;
pub use clock::{ManualClock, MonotonicClock, TimeSource};
pub use config::{ConfigError, RegistryConfig, RegistryConfigUpdate, SelectionWeights};
pub use content::{ContentItem, ContentType, DisplayedEntry, RegistryStats, TypeCounts};
pub use content_registry::ContentRegistry;
pub use selector::Selector;
