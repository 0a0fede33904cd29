//! Filter to remove items that can't be rendered as a swipe card.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Keeps only candidates with a poster.
pub struct DisplayAssetsFilter;

impl Filter for DisplayAssetsFilter {
    fn name(&self) -> &str {
        "DisplayAssetsFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, _context: &UserContext) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.item.has_display_assets())
            .collect())
    }
}
