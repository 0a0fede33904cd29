//! Engine tuning knobs.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "cold_start_threshold": 5, "curated_floor": { "min_rating": 8.0, "min_votes": 500 } }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sources::QualityFloor;
use std::path::Path;
use std::time::Duration;

/// Rating and vote-count gate applied to a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorConfig {
    pub min_rating: f32,
    pub min_votes: u32,
}

impl From<FloorConfig> for QualityFloor {
    fn from(floor: FloorConfig) -> Self {
        QualityFloor {
            min_rating: floor.min_rating,
            min_votes: floor.min_votes,
        }
    }
}

impl From<QualityFloor> for FloorConfig {
    fn from(floor: QualityFloor) -> Self {
        FloorConfig {
            min_rating: floor.min_rating,
            min_votes: floor.min_votes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Swipes needed before personalized ranking replaces the curated pool
    #[serde(default = "default_cold_start_threshold")]
    pub cold_start_threshold: u32,

    /// Recommendations returned per call
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_max_per_genre")]
    pub max_per_genre: usize,

    #[serde(default = "default_max_per_language")]
    pub max_per_language: usize,

    /// Extra pages fetched when a page has nothing new
    #[serde(default = "default_max_page_retries")]
    pub max_page_retries: u32,

    #[serde(default = "default_similarity_ttl_secs")]
    pub similarity_ttl_secs: u64,

    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Recent likes sampled for item-item association
    #[serde(default = "default_liked_sample")]
    pub liked_sample: usize,

    #[serde(default = "default_curated_floor")]
    pub curated_floor: FloorConfig,

    #[serde(default = "default_steady_floor")]
    pub steady_floor: FloorConfig,
}

fn default_cold_start_threshold() -> u32 {
    10
}

fn default_limit() -> usize {
    20
}

fn default_max_per_genre() -> usize {
    3
}

fn default_max_per_language() -> usize {
    5
}

fn default_max_page_retries() -> u32 {
    3
}

fn default_similarity_ttl_secs() -> u64 {
    300
}

fn default_min_similarity() -> f32 {
    sources::DEFAULT_MIN_SIMILARITY
}

fn default_liked_sample() -> usize {
    sources::user_context::DEFAULT_LIKED_SAMPLE
}

fn default_curated_floor() -> FloorConfig {
    QualityFloor::CURATED.into()
}

fn default_steady_floor() -> FloorConfig {
    QualityFloor::STEADY.into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cold_start_threshold: default_cold_start_threshold(),
            limit: default_limit(),
            max_per_genre: default_max_per_genre(),
            max_per_language: default_max_per_language(),
            max_page_retries: default_max_page_retries(),
            similarity_ttl_secs: default_similarity_ttl_secs(),
            min_similarity: default_min_similarity(),
            liked_sample: default_liked_sample(),
            curated_floor: default_curated_floor(),
            steady_floor: default_steady_floor(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn similarity_ttl(&self) -> Duration {
        Duration::from_secs(self.similarity_ttl_secs)
    }

    /// Configure the cold-start threshold (default: 10)
    pub fn with_cold_start_threshold(mut self, threshold: u32) -> Self {
        self.cold_start_threshold = threshold;
        self
    }

    /// Configure recommendations per call (default: 20)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Configure page retries (default: 3)
    pub fn with_max_page_retries(mut self, retries: u32) -> Self {
        self.max_page_retries = retries;
        self
    }

    /// Configure the curated cold-start floor (default: 7.5 rating, 1000 votes)
    pub fn with_curated_floor(mut self, floor: QualityFloor) -> Self {
        self.curated_floor = floor.into();
        self
    }

    /// Configure the steady-state floor (default: 5.0 rating, 50 votes)
    pub fn with_steady_floor(mut self, floor: QualityFloor) -> Self {
        self.steady_floor = floor.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cold_start_threshold, 10);
        assert_eq!(config.limit, 20);
        assert_eq!(config.max_per_genre, 3);
        assert_eq!(config.max_per_language, 5);
        assert_eq!(config.similarity_ttl(), Duration::from_secs(300));
        assert_eq!(QualityFloor::from(config.curated_floor), QualityFloor::CURATED);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cold_start_threshold": 5, "steady_floor": {{"min_rating": 6.0, "min_votes": 10}}}}"#
        )
        .unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.cold_start_threshold, 5);
        assert_eq!(config.steady_floor, FloorConfig { min_rating: 6.0, min_votes: 10 });
        assert_eq!(config.limit, 20);
        assert_eq!(config.curated_floor, default_curated_floor());
    }

    #[test]
    fn test_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(EngineConfig::from_json_file(file.path()).is_err());
        assert!(EngineConfig::from_json_file(Path::new("/nonexistent/config.json")).is_err());
    }
}
