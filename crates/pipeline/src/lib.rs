//! Pipeline for filtering, scoring and diversifying swipe candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - ContentScorer for matching items against a taste profile
//! - HybridScorer for blending content and peer signals
//!
//! ## Architecture
//! A personalized ranking pass runs in stages:
//! 1. Filters drop seen items and items that can't be displayed
//! 2. Peer signals for the surviving candidates are gathered once
//! 3. HybridScorer scores and sorts the candidates
//! 4. DiversityFilter picks the final set from the ranked list
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, HybridScorer};
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(AlreadySeenFilter)
//!     .add_filter(DisplayAssetsFilter);
//! let filtered = pipeline.apply(candidates, &context)?;
//!
//! let scorer = HybridScorer::new().with_peer_store(peers);
//! let ids: Vec<_> = filtered.iter().map(|c| c.content_id()).collect();
//! let signals = scorer.gather_signals(&context, similarities, &ids).await;
//! let ranked = scorer.rank(filtered, &context, &signals);
//! let picked = DiversityFilter::default().select(ranked);
//! ```

pub mod content_scorer;
pub mod filter_pipeline;
pub mod filters;
pub mod hybrid;
pub mod traits;

// Re-export main types
pub use content_scorer::{ContentScore, ContentScorer, ScoreTerm};
pub use filter_pipeline::FilterPipeline;
pub use hybrid::{HybridScore, HybridScorer, PeerSignals};
pub use traits::Filter;
