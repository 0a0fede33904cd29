//! # Sources Crate
//!
//! Everything a ranking pass reads from outside the session.
//!
//! ## Components
//!
//! ### Catalog Gateway
//! Paged, filtered discovery queries against the content catalog:
//! - Content type, language, genre and release-year filters
//! - A quality floor separating the curated cold-start pool from the
//!   steady-state stream
//!
//! ### Peer Signal Store
//! Every user's actions, queried per item and per user. The current
//! user's swipes are mirrored into it.
//!
//! ### Peer Similarity
//! Agreement-based similarity between the user and every peer with enough
//! overlapping history, plus a short-lived cache of the result.
//!
//! ### User Context
//! A detached snapshot of the session taken at the start of a ranking pass.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{IndexedCatalog, InMemoryPeerStore, PeerSimilarity, DiscoverQuery};
//! use std::sync::Arc;
//!
//! let data_index = Arc::new(DataIndex::load_from_dir("data/demo")?);
//! let catalog = IndexedCatalog::new(data_index.clone());
//! let peers = Arc::new(InMemoryPeerStore::from_index(&data_index));
//!
//! let page = catalog.discover(&DiscoverQuery::new(ContentType::Movie)).await?;
//! let similar = PeerSimilarity::new(peers).find_similar_users(user_id, 0.3).await?;
//! ```

pub mod cache;
pub mod catalog;
pub mod error;
pub mod peers;
pub mod similarity;
pub mod types;
pub mod user_context;

// Re-export commonly used types
pub use cache::{DEFAULT_SIMILARITY_TTL, SimilarityCache};
pub use catalog::{CatalogGateway, CatalogPage, DiscoverQuery, IndexedCatalog, QualityFloor};
pub use error::SourceError;
pub use peers::{InMemoryPeerStore, PeerSignalStore};
pub use similarity::{DEFAULT_MIN_SIMILARITY, Overlap, PeerSimilarity, SimilarityMap};
pub use types::{Candidate, CandidateSource, UserContext};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::ContentItem;

    #[test]
    fn test_candidate_creation() {
        let candidate = Candidate::new(ContentItem::new(1, "Heat"), CandidateSource::Curated);
        assert_eq!(candidate.content_id(), 1);
        assert_eq!(candidate.source, CandidateSource::Curated);
        assert_eq!(candidate.score, 0.0);
        assert!(candidate.explanation.is_empty());
    }
}
