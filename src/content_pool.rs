//! Partition bookkeeping for catalog content.
//!
//! The pool owns the authoritative split of catalog ids into available,
//! displayed, and cooling sets, plus the per-item display metadata and the
//! append-only display history. Every id is in exactly one partition at any
//! observable instant, and their union is the catalog.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::content::{ContentItem, DisplayedEntry, TypeCounts};

pub struct ContentPool {
    /// Permanent index of all catalog items. Descriptors handed back to
    /// callers are always rehydrated from here, never rebuilt from history.
    catalog: HashMap<String, ContentItem>,
    available: HashSet<String>,
    displayed: HashMap<String, DisplayedEntry>,
    cooling: HashSet<String>,
    history: HashMap<String, Vec<u64>>,
}

impl ContentPool {
    pub fn new() -> Self {
        Self {
            catalog: HashMap::new(),
            available: HashSet::new(),
            displayed: HashMap::new(),
            cooling: HashSet::new(),
            history: HashMap::new(),
        }
    }

    /// Replaces all pool state with a fresh catalog, every item available.
    ///
    /// Re-initialization is a session reset; prior display tracking is
    /// discarded. Duplicate ids keep the first occurrence.
    pub fn initialize(&mut self, items: Vec<ContentItem>) {
        self.clear();
        for mut item in items {
            if self.catalog.contains_key(&item.id) {
                warn!("Skipping duplicate pool id: id={}", item.id);
                continue;
            }
            item.last_displayed_ms = None;
            item.display_count = 0;
            self.available.insert(item.id.clone());
            self.catalog.insert(item.id.clone(), item);
        }
    }

    pub fn clear(&mut self) {
        self.catalog.clear();
        self.available.clear();
        self.displayed.clear();
        self.cooling.clear();
        self.history.clear();
    }

    /// Moves an item `available -> displayed` and records the display.
    ///
    /// Returns false without state change when the id is not currently
    /// available.
    pub fn mark_displayed(&mut self, content_id: &str, bubble_id: &str, now_ms: u64) -> bool {
        if !self.available.contains(content_id) {
            return false;
        }
        let Some(item) = self.catalog.get_mut(content_id) else {
            return false;
        };

        self.available.remove(content_id);
        item.last_displayed_ms = Some(now_ms);
        item.display_count += 1;
        self.history
            .entry(content_id.to_string())
            .or_default()
            .push(now_ms);
        self.displayed.insert(
            content_id.to_string(),
            DisplayedEntry {
                content_id: content_id.to_string(),
                bubble_id: bubble_id.to_string(),
                content_type: item.content_type,
                displayed_at_ms: now_ms,
            },
        );
        debug!(
            "Content displayed: id={} bubble={} at={}ms",
            content_id, bubble_id, now_ms
        );
        true
    }

    /// Removes a displayed entry. The item cools when its cooldown window
    /// is still open, otherwise it is immediately available again.
    pub fn mark_hidden(&mut self, content_id: &str, now_ms: u64, cooldown_ms: u64) -> bool {
        let Some(entry) = self.displayed.remove(content_id) else {
            return false;
        };
        let still_cooling = self
            .catalog
            .get(content_id)
            .and_then(|item| item.last_displayed_ms)
            .is_some_and(|last| now_ms.saturating_sub(last) < cooldown_ms);

        if still_cooling {
            debug!("Content hidden, cooling: id={}", content_id);
            self.cooling.insert(entry.content_id);
        } else {
            debug!("Content hidden, available: id={}", content_id);
            self.available.insert(entry.content_id);
        }
        true
    }

    /// Moves every cooling item whose cooldown has elapsed back to
    /// available. Called lazily on query, there is no background timer.
    pub fn promote_expired_cooling(&mut self, now_ms: u64, cooldown_ms: u64) {
        if self.cooling.is_empty() {
            return;
        }
        let expired: Vec<String> = self
            .cooling
            .iter()
            .filter(|id| {
                self.catalog
                    .get(id.as_str())
                    .and_then(|item| item.last_displayed_ms)
                    .is_none_or(|last| now_ms.saturating_sub(last) >= cooldown_ms)
            })
            .cloned()
            .collect();
        for content_id in expired {
            debug!("Cooldown elapsed: id={}", content_id);
            self.cooling.remove(&content_id);
            self.available.insert(content_id);
        }
    }

    /// Forced-rotation path: `displayed -> available`, cooldown bypassed.
    pub fn force_release(&mut self, content_id: &str) -> bool {
        let Some(entry) = self.displayed.remove(content_id) else {
            return false;
        };
        self.available.insert(entry.content_id);
        true
    }

    pub fn item(&self, content_id: &str) -> Option<&ContentItem> {
        self.catalog.get(content_id)
    }

    pub fn is_displayed(&self, content_id: &str) -> bool {
        self.displayed.contains_key(content_id)
    }

    pub fn content_for_bubble(&self, bubble_id: &str) -> Option<String> {
        self.displayed
            .values()
            .find(|entry| entry.bubble_id == bubble_id)
            .map(|entry| entry.content_id.clone())
    }

    pub fn bubble_id_in_use(&self, bubble_id: &str) -> bool {
        self.displayed
            .values()
            .any(|entry| entry.bubble_id == bubble_id)
    }

    /// Available items in id order, so seeded selection is reproducible.
    pub fn available_items(&self) -> Vec<&ContentItem> {
        let mut items: Vec<&ContentItem> = self
            .available
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect();
        items.sort_by(|left, right| left.id.cmp(&right.id));
        items
    }

    pub fn displayed_entries(&self) -> Vec<&DisplayedEntry> {
        let mut entries: Vec<&DisplayedEntry> = self.displayed.values().collect();
        entries.sort_by_key(|entry| entry.displayed_at_ms);
        entries
    }

    pub fn oldest_displayed(&self) -> Option<&DisplayedEntry> {
        self.displayed
            .values()
            .min_by_key(|entry| entry.displayed_at_ms)
    }

    pub fn displayed_type_counts(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for entry in self.displayed.values() {
            counts.add(entry.content_type);
        }
        counts
    }

    pub fn catalog_type_counts(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for item in self.catalog.values() {
            counts.add(item.content_type);
        }
        counts
    }

    pub fn history(&self, content_id: &str) -> &[u64] {
        self.history
            .get(content_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    pub fn available_is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn displayed_len(&self) -> usize {
        self.displayed.len()
    }

    pub fn cooling_len(&self) -> usize {
        self.cooling.len()
    }
}

impl Default for ContentPool {
    fn default() -> Self {
        Self::new()
    }
}
