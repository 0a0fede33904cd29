//! Diversity filter: caps how often one genre or language can appear.
//!
//! ## Algorithm
//! Walk the candidates in ranked order, keeping running counts of the
//! accepted set's primary genres and languages:
//! - Reject a candidate whose primary genre already appears `max_per_genre`
//!   times, or whose language already appears `max_per_language` times
//! - Otherwise accept it
//! - Stop once `limit` candidates are accepted
//!
//! If nothing is accepted, the top `limit` of the input are returned
//! unchanged.
//!
//! Input must already be sorted best-first.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_MAX_PER_GENRE: usize = 3;
pub const DEFAULT_MAX_PER_LANGUAGE: usize = 5;
pub const DEFAULT_LIMIT: usize = 20;

pub struct DiversityFilter {
    max_per_genre: usize,
    max_per_language: usize,
    limit: usize,
}

impl DiversityFilter {
    pub fn new(max_per_genre: usize, max_per_language: usize, limit: usize) -> Self {
        Self {
            max_per_genre,
            max_per_language,
            limit,
        }
    }

    /// Select from ranked candidates. Items without genres or a language
    /// never count toward those caps.
    pub fn select(&self, ranked: Vec<Candidate>) -> Vec<Candidate> {
        let mut genre_counts: HashMap<String, usize> = HashMap::new();
        let mut language_counts: HashMap<String, usize> = HashMap::new();
        let mut accepted = Vec::with_capacity(self.limit.min(ranked.len()));
        let mut rejected_any = false;

        for candidate in &ranked {
            if accepted.len() >= self.limit {
                break;
            }

            let genre = candidate.item.primary_genre();
            let language = Some(candidate.item.language.as_str()).filter(|l| !l.is_empty());

            let genre_full = genre
                .is_some_and(|g| genre_counts.get(g).copied().unwrap_or(0) >= self.max_per_genre);
            let language_full = language.is_some_and(|l| {
                language_counts.get(l).copied().unwrap_or(0) >= self.max_per_language
            });
            if genre_full || language_full {
                rejected_any = true;
                continue;
            }

            if let Some(g) = genre {
                *genre_counts.entry(g.to_string()).or_insert(0) += 1;
            }
            if let Some(l) = language {
                *language_counts.entry(l.to_string()).or_insert(0) += 1;
            }
            accepted.push(candidate.clone());
        }

        if accepted.is_empty() {
            debug!("Diversity filter accepted nothing, falling back to top {}", self.limit);
            return ranked.into_iter().take(self.limit).collect();
        }
        if rejected_any {
            debug!(
                "Diversity filter accepted {} of {} candidates",
                accepted.len(),
                ranked.len()
            );
        }
        accepted
    }
}

impl Default for DiversityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_GENRE, DEFAULT_MAX_PER_LANGUAGE, DEFAULT_LIMIT)
    }
}

impl Filter for DiversityFilter {
    fn name(&self) -> &str {
        "DiversityFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, _context: &UserContext) -> Result<Vec<Candidate>> {
        Ok(self.select(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::ContentItem;
    use sources::CandidateSource;

    fn candidate(id: u64, genre: &str, language: &str) -> Candidate {
        Candidate::new(
            ContentItem::new(id, format!("Item {id}"))
                .with_genres([genre])
                .with_language(language),
            CandidateSource::Discover,
        )
    }

    fn ids(candidates: &[Candidate]) -> Vec<u64> {
        candidates.iter().map(Candidate::content_id).collect()
    }

    #[test]
    fn test_genre_cap() {
        let ranked = vec![
            candidate(1, "Action", "en"),
            candidate(2, "Action", "fr"),
            candidate(3, "Action", "de"),
            candidate(4, "Action", "es"),
            candidate(5, "Drama", "it"),
        ];

        let selected = DiversityFilter::default().select(ranked);
        assert_eq!(ids(&selected), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_language_cap() {
        let genres = ["A", "B", "C", "D", "E", "F", "G"];
        let ranked: Vec<_> = genres
            .iter()
            .enumerate()
            .map(|(i, g)| candidate(i as u64, g, "en"))
            .chain(std::iter::once(candidate(99, "H", "ko")))
            .collect();

        let selected = DiversityFilter::default().select(ranked);
        assert_eq!(ids(&selected), vec![0, 1, 2, 3, 4, 99]);
    }

    #[test]
    fn test_stops_at_limit() {
        let ranked: Vec<_> = (0..50).map(|i| candidate(i, &format!("G{i}"), &format!("L{i}"))).collect();
        let selected = DiversityFilter::default().select(ranked);
        assert_eq!(selected.len(), DEFAULT_LIMIT);
        assert_eq!(selected[0].content_id(), 0);
    }

    #[test]
    fn test_zero_caps_fall_back_to_top() {
        let ranked: Vec<_> = (0..5).map(|i| candidate(i, "Action", "en")).collect();
        let selected = DiversityFilter::new(0, 0, 3).select(ranked);
        assert_eq!(ids(&selected), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(DiversityFilter::default().select(Vec::new()).is_empty());
    }
}
