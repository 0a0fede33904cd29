//! Engine crate for the swipe recommendation service.
//!
//! This crate contains the engine that coordinates catalog fetches, the
//! session, peer signals and the ranking pipeline.

pub mod config;
pub mod orchestrator;
pub mod presentation;

pub use config::{EngineConfig, FloorConfig};
pub use orchestrator::{
    CURATED_EXPLANATION, Recommendation, RecommendationEngine, RecommendationOutcome,
};
pub use presentation::shuffle_for_presentation;
