//! DataIndex building and validation.
//!
//! Loads a dataset directory, builds the browse-order index and checks
//! that peer actions only reference catalog items.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Load a dataset directory (catalog.json + peer_actions.json)
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Insert items and actions
    /// 3. Build the popularity ordering
    /// 4. Validate references
    ///
    /// A missing peer_actions.json is treated as an empty peer store.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog dataset from {:?}", data_dir);

        let catalog_path = data_dir.join("catalog.json");
        let actions_path = data_dir.join("peer_actions.json");

        let (items, actions) = rayon::join(
            || parser::parse_catalog(&catalog_path),
            || {
                if actions_path.exists() {
                    parser::parse_peer_actions(&actions_path)
                } else {
                    Ok(Vec::new())
                }
            },
        );
        let items = items?;
        let actions = actions?;

        info!("Loaded {} items, {} peer actions", items.len(), actions.len());

        let mut index = DataIndex::new();
        for item in items {
            index.insert_item(item);
        }
        for action in actions {
            index.insert_action(action);
        }

        index.build_secondary_indices();
        index.validate()?;

        Ok(index)
    }

    /// Rebuild the browse ordering after items were inserted.
    ///
    /// Popularity descending, ties broken by id so paging is stable.
    pub fn build_secondary_indices(&mut self) {
        let mut ordered: Vec<(ContentId, f32)> = self
            .items
            .par_iter()
            .map(|(&id, item)| (id, item.popularity))
            .collect();

        ordered.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        self.popularity_order = ordered.into_iter().map(|(id, _)| id).collect();
    }

    /// Check that every peer action references a catalog item.
    pub fn validate(&self) -> Result<()> {
        for content_id in self.content_actions.keys() {
            if !self.items.contains_key(content_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Content".to_string(),
                    id: *content_id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_secondary_indices_orders_by_popularity() {
        let mut index = DataIndex::new();
        index.insert_item(ContentItem::new(1, "Low").with_popularity(1.0));
        index.insert_item(ContentItem::new(2, "High").with_popularity(90.0));
        index.insert_item(ContentItem::new(3, "Tie").with_popularity(1.0));

        index.build_secondary_indices();
        assert_eq!(index.items_by_popularity(), &[2, 1, 3]);
    }

    #[test]
    fn test_validate_catches_dangling_actions() {
        let mut index = DataIndex::new();
        index.insert_item(ContentItem::new(1, "Known"));
        index.insert_action(PeerAction { user_id: 5, content_id: 2, action: ActionKind::Like });

        assert!(matches!(
            index.validate(),
            Err(DataLoadError::MissingReference { id: 2, .. })
        ));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("catalog.json"),
            r#"[{"id": 1, "title": "A", "popularity": 3.0},
                {"id": 2, "title": "B", "popularity": 9.0}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("peer_actions.json"),
            r#"[{"user_id": 10, "content_id": 2, "action": "like"}]"#,
        )
        .unwrap();

        let index = DataIndex::load_from_dir(dir.path()).unwrap();
        assert_eq!(index.counts(), (2, 1, 1));
        assert_eq!(index.items_by_popularity(), &[2, 1]);
    }

    #[test]
    fn test_load_from_dir_without_peer_actions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("catalog.json"), r#"[{"id": 1, "title": "A"}]"#).unwrap();

        let index = DataIndex::load_from_dir(dir.path()).unwrap();
        assert_eq!(index.counts(), (1, 0, 0));
    }
}
