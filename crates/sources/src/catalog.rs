//! Catalog Gateway - where candidate content comes from
//!
//! The catalog itself is an external service. This module defines the query
//! contract the engine uses against it and an implementation backed by a
//! loaded `DataIndex`.
//!
//! ## Query contract
//! `discover` takes a content type, language and genre filters, an optional
//! release-year range, a 1-based page number and an optional quality floor,
//! and returns one page of items plus whether more pages exist. The quality
//! floor separates the tight cold-start pool from the relaxed steady-state
//! stream.

use crate::error::SourceError;
use async_trait::async_trait;
use data_loader::{ContentItem, ContentType, DataIndex, YearRange};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Minimum quality an item must meet to be returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityFloor {
    pub min_rating: f32,
    pub min_votes: u32,
}

impl QualityFloor {
    /// Tight floor for the curated cold-start pool
    pub const CURATED: QualityFloor = QualityFloor {
        min_rating: 7.5,
        min_votes: 1000,
    };

    /// Relaxed floor for regular personalized fetches
    pub const STEADY: QualityFloor = QualityFloor {
        min_rating: 5.0,
        min_votes: 50,
    };

    pub fn admits(&self, item: &ContentItem) -> bool {
        item.rating >= self.min_rating && item.vote_count >= self.min_votes
    }
}

/// One catalog query.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub content_type: ContentType,
    /// Empty means any language
    pub languages: Vec<String>,
    /// Empty means any genre; otherwise an item needs at least one of them
    pub genres: Vec<String>,
    pub year_range: Option<YearRange>,
    /// 1-based
    pub page: u32,
    pub quality_floor: Option<QualityFloor>,
}

impl DiscoverQuery {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            languages: Vec::new(),
            genres: Vec::new(),
            year_range: None,
            page: 1,
            quality_floor: None,
        }
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_genres(mut self, genres: Vec<String>) -> Self {
        self.genres = genres;
        self
    }

    pub fn with_year_range(mut self, year_range: Option<YearRange>) -> Self {
        self.year_range = year_range;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_quality_floor(mut self, floor: QualityFloor) -> Self {
        self.quality_floor = Some(floor);
        self
    }

    /// Whether `item` satisfies every filter of this query.
    pub fn matches(&self, item: &ContentItem) -> bool {
        item.content_type == self.content_type
            && (self.languages.is_empty() || self.languages.iter().any(|l| *l == item.language))
            && (self.genres.is_empty() || self.genres.iter().any(|g| item.has_genre(g)))
            && self
                .year_range
                .is_none_or(|range| range.contains(item.release_year()))
            && self.quality_floor.is_none_or(|floor| floor.admits(item))
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub items: Vec<ContentItem>,
    pub has_more: bool,
}

/// Source of candidate content.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn discover(&self, query: &DiscoverQuery) -> Result<CatalogPage, SourceError>;
}

/// Catalog served from a loaded dataset, in popularity order.
#[derive(Clone)]
pub struct IndexedCatalog {
    data_index: Arc<DataIndex>,
    page_size: usize,
}

impl IndexedCatalog {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            data_index,
            page_size: 20,
        }
    }

    /// Configure items per page (default: 20)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[async_trait]
impl CatalogGateway for IndexedCatalog {
    #[instrument(skip(self, query), fields(page = query.page))]
    async fn discover(&self, query: &DiscoverQuery) -> Result<CatalogPage, SourceError> {
        let matching: Vec<&ContentItem> = self
            .data_index
            .items_by_popularity()
            .iter()
            .filter_map(|&id| self.data_index.get_item(id))
            .filter(|item| query.matches(item))
            .collect();

        let start = (query.page.max(1) as usize - 1) * self.page_size;
        let items: Vec<ContentItem> = matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&item| item.clone())
            .collect();
        let has_more = start + items.len() < matching.len();

        debug!(
            "Catalog page {} -> {} items ({} matching)",
            query.page,
            items.len(),
            matching.len()
        );
        Ok(CatalogPage { items, has_more })
    }
}
