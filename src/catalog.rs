//! Catalog adapter: input records and the merge that builds content items.
//!
//! The data-loading layer hands the registry one `CatalogInput` at
//! initialization. When a consolidated contributor list is present it takes
//! priority over the raw person records, letting an external
//! person-deduplication step merge same-named contributors into one entry.

use std::collections::HashSet;

use log::warn;
use serde::Deserialize;

use crate::content::{ContentItem, ContentType};

/// Song record supplied by the data-loading layer.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub name: String,
    /// Number of related catalog entries (contributors, tags).
    #[serde(default)]
    pub related_count: u32,
}

/// Raw contributor record, used only when no consolidated list is supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub related_count: u32,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Tag record supplied by the data-loading layer.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub related_count: u32,
}

/// Consolidated contributor produced by an external deduplication step,
/// one per distinct name.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsolidatedPerson {
    pub id: String,
    pub name: String,
    /// Total number of songs this contributor appears on.
    #[serde(default)]
    pub related_song_count: u32,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Full catalog handed to the registry at initialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogInput {
    #[serde(default)]
    pub songs: Vec<SongRecord>,
    #[serde(default)]
    pub persons: Vec<PersonRecord>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub consolidated_persons: Vec<ConsolidatedPerson>,
}

/// Builds the initial content item set from catalog input.
///
/// Duplicate ids keep the first occurrence; later ones are skipped with a
/// warning so a malformed catalog cannot break the partition bookkeeping.
pub fn build_content_items(input: &CatalogInput) -> Vec<ContentItem> {
    let mut seen_ids = HashSet::new();
    let mut items = Vec::new();

    for song in &input.songs {
        push_item(
            &mut items,
            &mut seen_ids,
            ContentItem::new(
                song.id.clone(),
                ContentType::Song,
                song.name.clone(),
                song.related_count,
            ),
        );
    }

    if input.consolidated_persons.is_empty() {
        for person in &input.persons {
            push_item(
                &mut items,
                &mut seen_ids,
                ContentItem::new(
                    person.id.clone(),
                    ContentType::Person,
                    person.name.clone(),
                    person.related_count,
                )
                .with_roles(person.roles.clone()),
            );
        }
    } else {
        for person in &input.consolidated_persons {
            push_item(
                &mut items,
                &mut seen_ids,
                ContentItem::new(
                    person.id.clone(),
                    ContentType::Person,
                    person.name.clone(),
                    person.related_song_count,
                )
                .with_roles(person.roles.clone()),
            );
        }
    }

    for tag in &input.tags {
        push_item(
            &mut items,
            &mut seen_ids,
            ContentItem::new(
                tag.id.clone(),
                ContentType::Tag,
                tag.name.clone(),
                tag.related_count,
            ),
        );
    }

    items
}

fn push_item(items: &mut Vec<ContentItem>, seen_ids: &mut HashSet<String>, item: ContentItem) {
    if !seen_ids.insert(item.id.clone()) {
        warn!(
            "Skipping duplicate catalog id: id={} type={}",
            item.id, item.content_type
        );
        return;
    }
    items.push(item);
}
