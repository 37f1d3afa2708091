//! Core data types shared by the pool, selector, and registry facade.

use serde::{Deserialize, Serialize};

/// Category of a selectable catalog unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Song,
    Person,
    Tag,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContentType::Song => "song",
            ContentType::Person => "person",
            ContentType::Tag => "tag",
        };
        write!(f, "{}", label)
    }
}

/// A selectable catalog unit (song, consolidated contributor, or tag).
///
/// Created once at catalog initialization. The volatile fields
/// (`last_displayed_ms`, `display_count`) are mutated only by the registry
/// on registration events; items are never destroyed, only moved between
/// the pool's partitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub content_type: ContentType,
    pub name: String,
    /// Number of related catalog entries, the popularity input for scoring.
    pub related_count: u32,
    /// Roles for multi-role contributors; empty for songs and tags.
    pub roles: Vec<String>,
    /// Timestamp of the most recent display, absent until first shown.
    pub last_displayed_ms: Option<u64>,
    pub display_count: u32,
}

impl ContentItem {
    pub fn new(id: String, content_type: ContentType, name: String, related_count: u32) -> Self {
        Self {
            id,
            content_type,
            name,
            related_count,
            roles: Vec::new(),
            last_displayed_ms: None,
            display_count: 0,
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }
}

/// One active on-screen occupancy.
///
/// Created on register, destroyed on unregister. At most one entry exists
/// per content id, and bubble handles never repeat among active entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayedEntry {
    pub content_id: String,
    /// Opaque handle chosen by the presentation layer, unique per bubble.
    pub bubble_id: String,
    pub content_type: ContentType,
    pub displayed_at_ms: u64,
}

/// Per-category counter triple used for balance scoring and statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub songs: usize,
    pub persons: usize,
    pub tags: usize,
}

impl TypeCounts {
    pub fn count(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::Song => self.songs,
            ContentType::Person => self.persons,
            ContentType::Tag => self.tags,
        }
    }

    pub fn add(&mut self, content_type: ContentType) {
        match content_type {
            ContentType::Song => self.songs += 1,
            ContentType::Person => self.persons += 1,
            ContentType::Tag => self.tags += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.songs + self.persons + self.tags
    }
}

/// Snapshot of registry occupancy for the debug/telemetry surface.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub total_content: usize,
    pub available_content: usize,
    pub displayed_content: usize,
    pub cooling_content: usize,
    pub catalog_per_type: TypeCounts,
    pub displayed_per_type: TypeCounts,
    pub rotation_cycle: u64,
}
