//! Filter to remove content the user has already acted on.
//!
//! This is typically the first filter in the pipeline: anything liked,
//! passed or saved must never come back as a card.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Removes candidates whose id is in `UserContext.seen`.
pub struct AlreadySeenFilter;

impl Filter for AlreadySeenFilter {
    fn name(&self) -> &str {
        "AlreadySeenFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.seen.contains(&candidate.content_id()))
            .collect();
        Ok(filtered)
    }
}
