//! Content-based scoring: how well an item matches the taste profile.
//!
//! ## Algorithm
//! Start at 0.5, then:
//! - +0.4 per genre the user likes
//! - -0.6 per genre the user dislikes
//! - +0.2 if the release decade is a preferred one
//! - +0.1 if the rating meets the user's rating preference
//! - +0.1 more if the rating is 8.0 or above
//! - -0.1 for pre-2000 releases unless the user likes a pre-2000 decade
//!
//! The result is clamped to [0, 1]. Every applied term is kept in the
//! breakdown so it can be shown to the user.

use data_loader::ContentItem;
use session::TasteProfile;

pub const BASE_SCORE: f32 = 0.5;
pub const LIKED_GENRE_BOOST: f32 = 0.4;
pub const DISLIKED_GENRE_PENALTY: f32 = -0.6;
pub const PREFERRED_DECADE_BOOST: f32 = 0.2;
pub const RATING_MATCH_BOOST: f32 = 0.1;
pub const HIGHLY_RATED_BOOST: f32 = 0.1;
pub const OLDER_RELEASE_PENALTY: f32 = -0.1;

/// Rating at or above which an item counts as highly rated
pub const HIGHLY_RATED_THRESHOLD: f32 = 8.0;

/// One contribution to a content score.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreTerm {
    LikedGenre(String),
    DislikedGenre(String),
    PreferredDecade(i32),
    MeetsRatingPreference,
    HighlyRated,
    OlderRelease,
}

impl ScoreTerm {
    /// Signed amount this term adds to the score.
    pub fn delta(&self) -> f32 {
        match self {
            ScoreTerm::LikedGenre(_) => LIKED_GENRE_BOOST,
            ScoreTerm::DislikedGenre(_) => DISLIKED_GENRE_PENALTY,
            ScoreTerm::PreferredDecade(_) => PREFERRED_DECADE_BOOST,
            ScoreTerm::MeetsRatingPreference => RATING_MATCH_BOOST,
            ScoreTerm::HighlyRated => HIGHLY_RATED_BOOST,
            ScoreTerm::OlderRelease => OLDER_RELEASE_PENALTY,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.delta() > 0.0
    }

    /// Human-readable reason, e.g. "You like Action".
    pub fn describe(&self) -> String {
        match self {
            ScoreTerm::LikedGenre(genre) => format!("You like {genre}"),
            ScoreTerm::DislikedGenre(genre) => format!("You've been passing on {genre}"),
            ScoreTerm::PreferredDecade(decade) => format!("From the {decade}s, an era you enjoy"),
            ScoreTerm::MeetsRatingPreference => "Rated in line with what you like".to_string(),
            ScoreTerm::HighlyRated => "Highly rated".to_string(),
            ScoreTerm::OlderRelease => "Older release".to_string(),
        }
    }
}

/// A content score together with the terms that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentScore {
    /// Clamped to [0, 1]
    pub score: f32,
    pub breakdown: Vec<ScoreTerm>,
}

impl ContentScore {
    /// Score above the neutral base, floored at zero.
    pub fn signal(&self) -> f32 {
        (self.score - BASE_SCORE).max(0.0)
    }

    /// Reasons for the terms that raised the score, in breakdown order.
    pub fn reasons(&self) -> Vec<String> {
        self.breakdown
            .iter()
            .filter(|term| term.is_positive())
            .map(ScoreTerm::describe)
            .collect()
    }
}

/// Scores items against a taste profile. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentScorer;

impl ContentScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, item: &ContentItem, profile: &TasteProfile) -> ContentScore {
        let mut breakdown = Vec::new();

        for genre in &item.genres {
            if profile.likes_genre(genre) {
                breakdown.push(ScoreTerm::LikedGenre(genre.clone()));
            }
            if profile.dislikes_genre(genre) {
                breakdown.push(ScoreTerm::DislikedGenre(genre.clone()));
            }
        }

        if let Some(decade) = item.decade().filter(|&d| profile.prefers_decade(d)) {
            breakdown.push(ScoreTerm::PreferredDecade(decade));
        }

        if item.rating >= profile.average_rating_preference {
            breakdown.push(ScoreTerm::MeetsRatingPreference);
            if item.rating >= HIGHLY_RATED_THRESHOLD {
                breakdown.push(ScoreTerm::HighlyRated);
            }
        }

        if item.release_year().is_some_and(|year| year < 2000) && !profile.has_pre_2000_affinity() {
            breakdown.push(ScoreTerm::OlderRelease);
        }

        let raw = BASE_SCORE + breakdown.iter().map(ScoreTerm::delta).sum::<f32>();
        ContentScore {
            score: raw.clamp(0.0, 1.0),
            breakdown,
        }
    }
}
