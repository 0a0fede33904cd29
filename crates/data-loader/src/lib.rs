//! # Data Loader Crate
//!
//! Domain types for the swipe recommender and the loader for on-disk
//! catalog datasets.
//!
//! ## Main Components
//!
//! - **types**: `ContentItem`, `ActionKind`, `PeerAction`, `DataIndex`
//! - **parser**: parse the JSON dataset files
//! - **index**: build and validate a `DataIndex` from a directory
//! - **error**: error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_dir(Path::new("data/demo"))?;
//! let item = index.get_item(27205).unwrap();
//! println!("{} has {} peer actions", item.title, index.get_content_actions(item.id).len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    ContentId,
    UserId,
    // Core types
    ActionKind,
    ContentItem,
    ContentType,
    DataIndex,
    PeerAction,
    YearRange,
    decade_of,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_index_creation() {
        let index = DataIndex::new();
        assert_eq!(index.counts(), (0, 0, 0));
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new();

        assert!(index.get_item(999).is_none());
        assert!(index.get_content_actions(999).is_empty());
        assert!(index.get_user_actions(999).is_empty());
        assert!(index.items_by_popularity().is_empty());
    }

    #[test]
    fn test_insert_item() {
        let mut index = DataIndex::new();
        index.insert_item(
            ContentItem::new(1, "Toy Story")
                .with_genres(["Animation", "Comedy"])
                .with_release_year(1995),
        );

        let retrieved = index.get_item(1).unwrap();
        assert_eq!(retrieved.title, "Toy Story");
        assert_eq!(retrieved.release_year(), Some(1995));
        assert_eq!(retrieved.genres.len(), 2);
    }
}
