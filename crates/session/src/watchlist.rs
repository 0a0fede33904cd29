//! Saved-for-later items.

use data_loader::{ContentId, ContentItem};
use crate::store::valid_entries;
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered set of saved items keyed by id, most recently saved first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Watchlist {
    items: Vec<ContentItem>,
}

impl<'de> Deserialize<'de> for Watchlist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            items: valid_entries(deserializer)?,
        })
    }
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save an item. Returns false (and changes nothing) if the id is already saved.
    pub fn add(&mut self, item: ContentItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    /// Remove by id. Returns whether anything was removed; absent ids are a no-op.
    pub fn remove(&mut self, id: ContentId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn contains(&self, id: ContentId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Most recently saved first
    pub fn list(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collapse duplicate ids in a list read back from storage, keeping the
    /// most recent copy.
    pub(crate) fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.items.retain(|item| seen.insert(item.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut watchlist = Watchlist::new();
        let item = ContentItem::new(1, "Dune");
        assert!(watchlist.add(item.clone()));
        assert!(!watchlist.add(item));
        assert_eq!(watchlist.len(), 1);
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let mut watchlist = Watchlist::new();
        watchlist.add(ContentItem::new(1, "First"));
        watchlist.add(ContentItem::new(2, "Second"));
        let ids: Vec<_> = watchlist.list().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut watchlist = Watchlist::new();
        watchlist.add(ContentItem::new(1, "Dune"));
        assert!(!watchlist.remove(42));
        assert!(watchlist.remove(1));
        assert!(watchlist.is_empty());
    }
}
