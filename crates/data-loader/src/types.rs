//! Core domain types shared by every crate in the workspace.
//!
//! This module defines the content items handed out by the catalog, the
//! swipe actions users take on them, and `DataIndex`, the in-memory store
//! a dataset directory is loaded into.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Catalog-unique identifier for a movie or series
pub type ContentId = u64;

/// Identifier for a user of the shared peer store
pub type UserId = u64;

// =============================================================================
// Content
// =============================================================================

/// Kind of content the catalog can be queried for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Movie,
    Series,
}

/// A movie or series as returned by the catalog.
///
/// Items are immutable once fetched and their identity is `id`. Genres are
/// kept in catalog order with duplicates removed; the first one is treated
/// as the item's primary genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub genres: Vec<String>,
    /// ISO 639-1 language code (e.g. "en", "ko")
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Average audience rating from 0.0 to 10.0
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub director: Option<String>,
    /// Poster artwork reference; items without one can't be shown on a card
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl ContentItem {
    /// Create a bare item with no genres, language, date or rating.
    pub fn new(id: ContentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content_type: ContentType::Movie,
            genres: Vec::new(),
            language: String::new(),
            release_date: None,
            rating: 0.0,
            vote_count: 0,
            popularity: 0.0,
            director: None,
            poster_path: None,
        }
    }

    /// Set the genre list, dropping duplicates but keeping the first-seen order.
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = Vec::new();
        for genre in genres {
            let genre = genre.into();
            if !self.genres.contains(&genre) {
                self.genres.push(genre);
            }
        }
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the release date to January 1st of `year`.
    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_date = NaiveDate::from_ymd_opt(year, 1, 1);
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_vote_count(mut self, vote_count: u32) -> Self {
        self.vote_count = vote_count;
        self
    }

    pub fn with_popularity(mut self, popularity: f32) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Start year of the release decade (e.g. 2014 -> 2010)
    pub fn decade(&self) -> Option<i32> {
        self.release_year().map(decade_of)
    }

    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Whether the item carries everything a swipe card needs to render.
    pub fn has_display_assets(&self) -> bool {
        self.poster_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty())
    }
}

/// Decade start year for a release year.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Inclusive release-year bounds. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: Option<i32>,
    pub to: Option<i32>,
}

impl YearRange {
    pub fn new(from: Option<i32>, to: Option<i32>) -> Self {
        Self { from, to }
    }

    /// Items without a release year only pass a fully open range.
    pub fn contains(&self, year: Option<i32>) -> bool {
        match year {
            Some(year) => {
                self.from.is_none_or(|from| year >= from) && self.to.is_none_or(|to| year <= to)
            }
            None => self.from.is_none() && self.to.is_none(),
        }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// What a user did with a swipe card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Like,
    Pass,
    SaveForLater,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::Pass => "pass",
            ActionKind::SaveForLater => "save_for_later",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ActionKind::Like),
            "pass" => Ok(ActionKind::Pass),
            "save" | "save_for_later" => Ok(ActionKind::SaveForLater),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// One row of the shared peer store: some user's action on some content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAction {
    pub user_id: UserId,
    pub content_id: ContentId,
    pub action: ActionKind,
}

// =============================================================================
// DataIndex - in-memory catalog and peer actions
// =============================================================================

/// Holds a loaded dataset: catalog items plus every user's actions.
///
/// A user has at most one action per content id; recording a new one
/// replaces the old.
#[derive(Debug, Default)]
pub struct DataIndex {
    pub(crate) items: HashMap<ContentId, ContentItem>,

    /// All actions taken on each content item
    pub(crate) content_actions: HashMap<ContentId, Vec<PeerAction>>,
    /// All actions taken by each user
    pub(crate) user_actions: HashMap<UserId, Vec<PeerAction>>,

    /// Item ids by popularity, highest first (the catalog's browse order)
    pub(crate) popularity_order: Vec<ContentId>,
}

impl DataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, id: ContentId) -> Option<&ContentItem> {
        self.items.get(&id)
    }

    /// Every action recorded against a content item
    pub fn get_content_actions(&self, content_id: ContentId) -> &[PeerAction] {
        self.content_actions
            .get(&content_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every action a user has taken
    pub fn get_user_actions(&self, user_id: UserId) -> &[PeerAction] {
        self.user_actions
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Item ids in browse order. Empty until `build_secondary_indices` runs.
    pub fn items_by_popularity(&self) -> &[ContentId] {
        &self.popularity_order
    }

    pub fn insert_item(&mut self, item: ContentItem) {
        self.items.insert(item.id, item);
    }

    /// Insert an action, replacing any earlier action by the same user on the same item.
    pub fn insert_action(&mut self, action: PeerAction) {
        let by_content = self.content_actions.entry(action.content_id).or_default();
        match by_content.iter_mut().find(|a| a.user_id == action.user_id) {
            Some(existing) => *existing = action,
            None => by_content.push(action),
        }

        let by_user = self.user_actions.entry(action.user_id).or_default();
        match by_user.iter_mut().find(|a| a.content_id == action.content_id) {
            Some(existing) => *existing = action,
            None => by_user.push(action),
        }
    }

    /// Remove a user's action on an item, returning it if there was one.
    pub fn remove_action(&mut self, user_id: UserId, content_id: ContentId) -> Option<PeerAction> {
        if let Some(by_content) = self.content_actions.get_mut(&content_id) {
            by_content.retain(|a| a.user_id != user_id);
            if by_content.is_empty() {
                self.content_actions.remove(&content_id);
            }
        }

        let by_user = self.user_actions.get_mut(&user_id)?;
        let position = by_user.iter().position(|a| a.content_id == content_id)?;
        let removed = by_user.remove(position);
        if by_user.is_empty() {
            self.user_actions.remove(&user_id);
        }
        Some(removed)
    }

    /// Every stored action, in no particular order
    pub fn actions(&self) -> impl Iterator<Item = &PeerAction> {
        self.user_actions.values().flatten()
    }

    /// (items, users with actions, actions)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_actions = self.user_actions.values().map(|v| v.len()).sum();
        (self.items.len(), self.user_actions.len(), total_actions)
    }
}
