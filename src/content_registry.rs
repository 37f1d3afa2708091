//! Registry facade coordinating pool, selector, and rotation.
//!
//! One `ContentRegistry` serves one visualization session and is passed to
//! collaborators explicitly; there is no process-wide shared state. The
//! presentation layer initializes it with the catalog, then calls
//! register/unregister/next from its frame loop. Expected failures
//! (duplicate registration, capacity overflow, pool exhaustion) come back
//! as booleans and `None`, never as panics, so the loop never stalls
//! mid-frame.

use log::{debug, info};

use crate::catalog::{self, CatalogInput};
use crate::clock::{MonotonicClock, TimeSource};
use crate::config::{ConfigError, RegistryConfig, RegistryConfigUpdate};
use crate::content::{ContentItem, ContentType, DisplayedEntry, RegistryStats};
use crate::content_pool::ContentPool;
use crate::rotation::RotationController;
use crate::selector::Selector;

pub struct ContentRegistry {
    pool: ContentPool,
    selector: Selector,
    rotation: RotationController,
    config: RegistryConfig,
    time_source: Box<dyn TimeSource>,
}

impl ContentRegistry {
    /// Creates a registry on a monotonic clock.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        Self::with_time_source(config, Box::new(MonotonicClock::new()))
    }

    /// Creates a registry on a caller-supplied time source, for hosts that
    /// drive virtual time and for timing tests.
    pub fn with_time_source(
        config: RegistryConfig,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pool: ContentPool::new(),
            selector: Selector::new(),
            rotation: RotationController::new(),
            config,
            time_source,
        })
    }

    /// Replaces the selector, pinning the seed for reproducible sessions.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Loads the catalog and starts a fresh session. Re-initialization
    /// discards all prior tracking.
    pub fn initialize(&mut self, input: &CatalogInput) {
        let items = catalog::build_content_items(input);
        info!("Initializing content registry: items={}", items.len());
        self.pool.initialize(items);
        self.rotation.reset();
    }

    /// Claims a display slot for `content_id` under the given bubble
    /// handle.
    ///
    /// Returns false, with no state change, when the content is already
    /// displayed, the display set is at capacity, the bubble handle is
    /// already in use, or the content is unknown, mismatched, or not
    /// currently available.
    pub fn register_bubble(
        &mut self,
        content_id: &str,
        bubble_id: &str,
        content_type: ContentType,
    ) -> bool {
        let now_ms = self.time_source.now_ms();
        self.pool
            .promote_expired_cooling(now_ms, self.config.rotation_cooldown_ms);

        if self.pool.is_displayed(content_id) {
            debug!("Rejecting duplicate registration: id={}", content_id);
            return false;
        }
        if self.pool.displayed_len() >= self.config.max_displayed_items {
            debug!(
                "Rejecting registration at capacity: id={} max={}",
                content_id, self.config.max_displayed_items
            );
            return false;
        }
        if self.pool.bubble_id_in_use(bubble_id) {
            debug!("Rejecting reused bubble handle: bubble={}", bubble_id);
            return false;
        }
        match self.pool.item(content_id) {
            Some(item) if item.content_type == content_type => {}
            Some(item) => {
                debug!(
                    "Rejecting registration with mismatched type: id={} expected={} got={}",
                    content_id, item.content_type, content_type
                );
                return false;
            }
            None => {
                debug!("Rejecting registration for unknown content: id={}", content_id);
                return false;
            }
        }
        self.pool.mark_displayed(content_id, bubble_id, now_ms)
    }

    /// Releases the bubble's display slot. Unknown handles are ignored;
    /// a bubble whose content was already reclaimed by forced rotation
    /// lands here.
    pub fn unregister_bubble(&mut self, bubble_id: &str) {
        let Some(content_id) = self.pool.content_for_bubble(bubble_id) else {
            debug!("Ignoring unregister for unknown bubble: bubble={}", bubble_id);
            return;
        };
        let now_ms = self.time_source.now_ms();
        self.pool
            .mark_hidden(&content_id, now_ms, self.config.rotation_cooldown_ms);
    }

    pub fn is_content_displayed(&self, content_id: &str) -> bool {
        self.pool.is_displayed(content_id)
    }

    /// Picks the next content that may be shown.
    ///
    /// Expired cooling items are promoted first. When nothing is available
    /// and rotation is enabled, the longest-displayed item is reclaimed and
    /// returned; `None` means the pool is exhausted with rotation disabled,
    /// or the catalog is empty. Returned descriptors are rehydrated from
    /// the catalog index and carry full metadata.
    pub fn next_unique_content(&mut self) -> Option<ContentItem> {
        let now_ms = self.time_source.now_ms();
        self.pool
            .promote_expired_cooling(now_ms, self.config.rotation_cooldown_ms);

        if self.pool.available_is_empty() {
            if !self.config.enable_rotation_strategy {
                debug!("Pool exhausted and rotation disabled, nothing to select");
                return None;
            }
            let reclaimed_id = self.rotation.reclaim_oldest(&mut self.pool)?;
            return self.pool.item(&reclaimed_id).cloned();
        }

        let displayed_counts = self.pool.displayed_type_counts();
        let candidates = self.pool.available_items();
        let picked = self
            .selector
            .select_next(&candidates, &displayed_counts, &self.config, now_ms)?;
        Some(picked.clone())
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_content: self.pool.catalog_len(),
            available_content: self.pool.available_len(),
            displayed_content: self.pool.displayed_len(),
            cooling_content: self.pool.cooling_len(),
            catalog_per_type: self.pool.catalog_type_counts(),
            displayed_per_type: self.pool.displayed_type_counts(),
            rotation_cycle: self.rotation.rotation_cycle(),
        }
    }

    pub fn available_content(&self) -> Vec<ContentItem> {
        self.pool
            .available_items()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn displayed_content(&self) -> Vec<DisplayedEntry> {
        self.pool
            .displayed_entries()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Past display timestamps for one content id, oldest first. Unknown
    /// ids yield an empty history.
    pub fn content_history(&self, content_id: &str) -> Vec<u64> {
        self.pool.history(content_id).to_vec()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Applies a partial configuration update. A rejected update leaves
    /// the previous configuration in place.
    pub fn update_config(&mut self, update: &RegistryConfigUpdate) -> Result<(), ConfigError> {
        let next = self.config.apply_update(update);
        next.validate()?;
        info!(
            "Registry config updated: max_displayed={} cooldown={}ms weighted={} rotation={}",
            next.max_displayed_items,
            next.rotation_cooldown_ms,
            next.enable_weighted_selection,
            next.enable_rotation_strategy
        );
        self.config = next;
        Ok(())
    }

    /// Clears all partitions, history, and the catalog index, and zeroes
    /// the rotation cycle. A fresh `initialize` is required afterwards.
    pub fn reset(&mut self) {
        info!("Resetting content registry");
        self.pool.clear();
        self.rotation.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::ContentRegistry;
    use crate::catalog::{CatalogInput, ConsolidatedPerson, SongRecord, TagRecord};
    use crate::clock::ManualClock;
    use crate::config::{RegistryConfig, RegistryConfigUpdate};
    use crate::content::{ContentType, RegistryStats};
    use crate::selector::Selector;

    fn test_registry(config: RegistryConfig) -> (ContentRegistry, ManualClock) {
        let clock = ManualClock::new();
        let registry = ContentRegistry::with_time_source(config, Box::new(clock.clone()))
            .expect("test config should validate")
            .with_selector(Selector::from_seed([1u8; 32]));
        (registry, clock)
    }

    fn song_catalog(ids: &[&str]) -> CatalogInput {
        CatalogInput {
            songs: ids
                .iter()
                .map(|id| SongRecord {
                    id: id.to_string(),
                    name: format!("Song {}", id),
                    related_count: 1,
                })
                .collect(),
            ..CatalogInput::default()
        }
    }

    fn assert_partition_invariant(stats: &RegistryStats) {
        assert_eq!(
            stats.available_content + stats.displayed_content + stats.cooling_content,
            stats.total_content
        );
    }

    #[test]
    fn test_capacity_and_duplicate_scenario() {
        let config = RegistryConfig {
            max_displayed_items: 2,
            rotation_cooldown_ms: 0,
            enable_weighted_selection: false,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A", "B", "C"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        assert!(registry.register_bubble("B", "b2", ContentType::Song));

        let next = registry.next_unique_content().expect("C is available");
        assert_eq!(next.id, "C");

        assert!(!registry.register_bubble("C", "b3", ContentType::Song));

        registry.unregister_bubble("b1");
        assert!(registry.register_bubble("C", "b3", ContentType::Song));
        assert_partition_invariant(&registry.stats());
    }

    #[test]
    fn test_single_item_forced_rotation_scenario() {
        let config = RegistryConfig {
            max_displayed_items: 1,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["only"]));

        assert!(registry.register_bubble("only", "b1", ContentType::Song));

        let next = registry
            .next_unique_content()
            .expect("forced rotation should reclaim the single item");
        assert_eq!(next.id, "only");
        assert_eq!(registry.stats().rotation_cycle, 1);
        assert!(!registry.is_content_displayed("only"));
    }

    #[test]
    fn test_duplicate_registration_leaves_state_unchanged() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());
        registry.initialize(&song_catalog(&["A", "B"]));
        assert!(registry.register_bubble("A", "b1", ContentType::Song));

        let before = registry.stats();
        assert!(!registry.register_bubble("A", "b2", ContentType::Song));
        let after = registry.stats();

        assert_eq!(before.displayed_content, after.displayed_content);
        assert_eq!(before.available_content, after.available_content);
        assert_eq!(registry.content_history("A").len(), 1);
    }

    #[test]
    fn test_bubble_handle_reuse_is_rejected() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());
        registry.initialize(&song_catalog(&["A", "B"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        assert!(!registry.register_bubble("B", "b1", ContentType::Song));
        assert!(registry.register_bubble("B", "b2", ContentType::Song));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());
        registry.initialize(&song_catalog(&["A"]));

        assert!(!registry.register_bubble("A", "b1", ContentType::Tag));
        assert!(registry.register_bubble("A", "b1", ContentType::Song));
    }

    #[test]
    fn test_capacity_limit_rejects_excess_registration() {
        let config = RegistryConfig {
            max_displayed_items: 2,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A", "B", "C"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        assert!(registry.register_bubble("B", "b2", ContentType::Song));
        assert!(!registry.register_bubble("C", "b3", ContentType::Song));
        assert_eq!(registry.stats().displayed_content, 2);
    }

    #[test]
    fn test_round_trip_with_zero_cooldown() {
        let config = RegistryConfig {
            rotation_cooldown_ms: 0,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        registry.unregister_bubble("b1");

        assert!(!registry.is_content_displayed("A"));
        let available: Vec<String> = registry
            .available_content()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(available, vec!["A".to_string()]);
    }

    #[test]
    fn test_cooldown_window_blocks_then_releases() {
        let config = RegistryConfig {
            rotation_cooldown_ms: 1_000,
            enable_rotation_strategy: false,
            ..RegistryConfig::default()
        };
        let (mut registry, clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        clock.advance(100);
        registry.unregister_bubble("b1");
        assert_eq!(registry.stats().cooling_content, 1);

        // Halfway through the window the item is still ineligible.
        clock.set(600);
        assert!(registry.next_unique_content().is_none());
        assert!(!registry.register_bubble("A", "b2", ContentType::Song));

        clock.set(1_101);
        let next = registry.next_unique_content().expect("cooldown elapsed");
        assert_eq!(next.id, "A");
        assert_eq!(registry.stats().cooling_content, 0);
    }

    #[test]
    fn test_starvation_avoided_with_rotation_enabled() {
        let config = RegistryConfig {
            max_displayed_items: 2,
            rotation_cooldown_ms: 60_000,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A", "B"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        assert!(registry.register_bubble("B", "b2", ContentType::Song));

        for _ in 0..20 {
            assert!(registry.next_unique_content().is_some());
            assert_partition_invariant(&registry.stats());
        }
    }

    #[test]
    fn test_exhausted_pool_with_rotation_disabled_returns_none() {
        let config = RegistryConfig {
            max_displayed_items: 2,
            rotation_cooldown_ms: 60_000,
            enable_rotation_strategy: false,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A", "B"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        assert!(registry.register_bubble("B", "b2", ContentType::Song));
        assert!(registry.next_unique_content().is_none());
    }

    #[test]
    fn test_forced_rotation_result_carries_full_metadata() {
        let config = RegistryConfig {
            max_displayed_items: 1,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&CatalogInput {
            songs: vec![SongRecord {
                id: "s1".to_string(),
                name: "So What".to_string(),
                related_count: 5,
            }],
            ..CatalogInput::default()
        });

        assert!(registry.register_bubble("s1", "b1", ContentType::Song));
        let reclaimed = registry
            .next_unique_content()
            .expect("rotation should reclaim");

        assert_eq!(reclaimed.name, "So What");
        assert_eq!(reclaimed.related_count, 5);
        assert_eq!(reclaimed.display_count, 1);
    }

    #[test]
    fn test_registering_cooling_content_is_rejected_until_promoted() {
        let config = RegistryConfig {
            rotation_cooldown_ms: 1_000,
            ..RegistryConfig::default()
        };
        let (mut registry, clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        clock.advance(100);
        registry.unregister_bubble("b1");

        clock.set(150);
        assert!(!registry.register_bubble("A", "b2", ContentType::Song));

        clock.set(1_000);
        assert!(registry.register_bubble("A", "b2", ContentType::Song));
    }

    #[test]
    fn test_unregister_unknown_bubble_is_a_no_op() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());
        registry.initialize(&song_catalog(&["A"]));
        assert!(registry.register_bubble("A", "b1", ContentType::Song));

        registry.unregister_bubble("no-such-bubble");
        assert!(registry.is_content_displayed("A"));
    }

    #[test]
    fn test_stale_bubble_after_forced_rotation_unregisters_silently() {
        let config = RegistryConfig {
            max_displayed_items: 1,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A"]));

        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        let reclaimed = registry.next_unique_content().expect("rotation reclaims");
        assert!(registry.register_bubble(&reclaimed.id, "b2", ContentType::Song));

        // The reclaimed bubble's lifetime ends later; its handle is gone.
        registry.unregister_bubble("b1");
        assert!(registry.is_content_displayed("A"));
        assert_eq!(registry.stats().displayed_content, 1);
    }

    #[test]
    fn test_empty_catalog_never_yields_content() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());
        registry.initialize(&CatalogInput::default());

        assert!(registry.next_unique_content().is_none());
        assert!(!registry.register_bubble("A", "b1", ContentType::Song));
        assert_eq!(registry.stats().total_content, 0);
    }

    #[test]
    fn test_stats_break_down_by_type() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());
        registry.initialize(&CatalogInput {
            songs: vec![SongRecord {
                id: "s1".to_string(),
                name: "So What".to_string(),
                related_count: 2,
            }],
            tags: vec![TagRecord {
                id: "t1".to_string(),
                name: "jazz".to_string(),
                related_count: 4,
            }],
            consolidated_persons: vec![ConsolidatedPerson {
                id: "p1".to_string(),
                name: "Miles Davis".to_string(),
                related_song_count: 9,
                roles: Vec::new(),
            }],
            ..CatalogInput::default()
        });

        assert!(registry.register_bubble("t1", "b1", ContentType::Tag));

        let stats = registry.stats();
        assert_eq!(stats.total_content, 3);
        assert_eq!(stats.catalog_per_type.songs, 1);
        assert_eq!(stats.catalog_per_type.persons, 1);
        assert_eq!(stats.catalog_per_type.tags, 1);
        assert_eq!(stats.displayed_per_type.tags, 1);
        assert_eq!(stats.displayed_per_type.songs, 0);
        assert_partition_invariant(&stats);
    }

    #[test]
    fn test_rejected_config_update_keeps_previous_config() {
        let (mut registry, _clock) = test_registry(RegistryConfig::default());

        let update = RegistryConfigUpdate {
            max_displayed_items: Some(0),
            ..RegistryConfigUpdate::default()
        };
        assert!(registry.update_config(&update).is_err());
        assert_eq!(registry.config().max_displayed_items, 15);

        let update = RegistryConfigUpdate {
            max_displayed_items: Some(3),
            rotation_cooldown_ms: Some(500),
            ..RegistryConfigUpdate::default()
        };
        assert!(registry.update_config(&update).is_ok());
        assert_eq!(registry.config().max_displayed_items, 3);
        assert_eq!(registry.config().rotation_cooldown_ms, 500);
    }

    #[test]
    fn test_reset_clears_everything() {
        let config = RegistryConfig {
            max_displayed_items: 1,
            ..RegistryConfig::default()
        };
        let (mut registry, _clock) = test_registry(config);
        registry.initialize(&song_catalog(&["A"]));
        assert!(registry.register_bubble("A", "b1", ContentType::Song));
        registry.next_unique_content();
        assert_eq!(registry.stats().rotation_cycle, 1);

        registry.reset();

        let stats = registry.stats();
        assert_eq!(stats.total_content, 0);
        assert_eq!(stats.displayed_content, 0);
        assert_eq!(stats.rotation_cycle, 0);
        assert!(registry.next_unique_content().is_none());
        assert!(registry.content_history("A").is_empty());
    }

    #[test]
    fn test_displayed_content_ordered_by_display_time() {
        let (mut registry, clock) = test_registry(RegistryConfig::default());
        registry.initialize(&song_catalog(&["A", "B"]));

        assert!(registry.register_bubble("B", "b1", ContentType::Song));
        clock.advance(50);
        assert!(registry.register_bubble("A", "b2", ContentType::Song));

        let displayed = registry.displayed_content();
        assert_eq!(displayed.len(), 2);
        assert_eq!(displayed[0].content_id, "B");
        assert_eq!(displayed[1].content_id, "A");
    }
}
