//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_seen;
pub mod display_assets;
pub mod diversity;

// Re-export for convenience
pub use already_seen::AlreadySeenFilter;
pub use display_assets::DisplayAssetsFilter;
pub use diversity::DiversityFilter;
