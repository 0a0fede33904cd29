//! Final presentation step.
//!
//! Ranking is deterministic. Callers that want some variety in card order
//! shuffle the finished list here with a randomness source they control.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::orchestrator::Recommendation;

/// Shuffle an already-ranked batch in place.
pub fn shuffle_for_presentation<R: Rng + ?Sized>(recommendations: &mut [Recommendation], rng: &mut R) {
    recommendations.shuffle(rng);
}
