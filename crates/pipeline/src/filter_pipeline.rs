//! Ordered chain of candidate filters.

use crate::traits::Filter;
use anyhow::{Context, Result};
use sources::{Candidate, UserContext};
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AlreadySeenFilter)
///     .add_filter(DisplayAssetsFilter);
///
/// let filtered = pipeline.apply(candidates, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter; filters run in the order they were added.
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run every filter in sequence. A failing filter aborts the pass and
    /// the error names the filter.
    pub fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>> {
        self.filters.iter().try_fold(candidates, |current, filter| {
            let before = current.len();
            let kept = filter
                .apply(current, context)
                .with_context(|| format!("Filter {} failed", filter.name()))?;
            debug!("{}: {} -> {} candidates", filter.name(), before, kept.len());
            Ok(kept)
        })
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
