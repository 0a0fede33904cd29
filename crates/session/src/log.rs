//! Bounded, ordered log of past swipes.

use chrono::{DateTime, Utc};
use data_loader::{ActionKind, ContentId, ContentItem};
use crate::store::valid_entries;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::VecDeque;

/// Entries kept before the oldest is dropped
pub const MAX_LOG_ENTRIES: usize = 100;

/// The parts of an item kept with a swipe, so history stays interpretable
/// after the catalog entry changes or disappears.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSnapshot {
    pub title: String,
    pub genres: Vec<String>,
    pub release_year: Option<i32>,
    pub rating: f32,
}

impl ContentSnapshot {
    pub fn of(item: &ContentItem) -> Self {
        Self {
            title: item.title.clone(),
            genres: item.genres.clone(),
            release_year: item.release_year(),
            rating: item.rating,
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// One logged swipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeAction {
    pub content_id: ContentId,
    pub action: ActionKind,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub snapshot: ContentSnapshot,
    /// Set when this swipe put the item on the watchlist (a save of an
    /// already-saved item leaves it false)
    #[serde(default = "default_true")]
    pub created_watchlist_entry: bool,
}

fn default_true() -> bool {
    true
}

impl SwipeAction {
    pub fn new(item: &ContentItem, action: ActionKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            content_id: item.id,
            action,
            timestamp,
            snapshot: ContentSnapshot::of(item),
            created_watchlist_entry: false,
        }
    }

    /// Rebuild a minimal item from the snapshot (id, title, genres, year, rating).
    pub fn to_item(&self) -> ContentItem {
        let mut item = ContentItem::new(self.content_id, self.snapshot.title.clone())
            .with_genres(self.snapshot.genres.iter().cloned())
            .with_rating(self.snapshot.rating);
        if let Some(year) = self.snapshot.release_year {
            item = item.with_release_year(year);
        }
        item
    }
}

/// Oldest-first list of at most `MAX_LOG_ENTRIES` swipes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InteractionLog {
    entries: VecDeque<SwipeAction>,
}

impl<'de> Deserialize<'de> for InteractionLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = valid_entries(deserializer)?;
        Ok(Self {
            entries: VecDeque::from(entries),
        })
    }
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a swipe, returning the entry that fell off the front if the
    /// log was full.
    pub(crate) fn push(&mut self, entry: SwipeAction) -> Option<SwipeAction> {
        self.entries.push_back(entry);
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub(crate) fn pop_last(&mut self) -> Option<SwipeAction> {
        self.entries.pop_back()
    }

    /// Drop the oldest entries of an over-long log read back from storage.
    pub(crate) fn enforce_cap(&mut self) {
        while self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&SwipeAction> {
        self.entries.back()
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SwipeAction> {
        self.entries.iter()
    }

    /// The most recent `n` swipes of one kind, newest first.
    pub fn recent(&self, action: ActionKind, n: usize) -> impl Iterator<Item = &SwipeAction> {
        self.entries
            .iter()
            .rev()
            .filter(move |entry| entry.action == action)
            .take(n)
    }

    /// Ids of the `n` most recently liked items, newest first.
    pub fn recent_likes(&self, n: usize) -> Vec<ContentId> {
        self.recent(ActionKind::Like, n)
            .map(|entry| entry.content_id)
            .collect()
    }

    /// Mean snapshot rating over every logged like.
    pub fn mean_like_rating(&self) -> Option<f32> {
        let (sum, count) = self
            .entries
            .iter()
            .filter(|entry| entry.action == ActionKind::Like)
            .fold((0.0f32, 0u32), |(sum, count), entry| {
                (sum + entry.snapshot.rating, count + 1)
            });
        (count > 0).then(|| sum / count as f32)
    }
}
