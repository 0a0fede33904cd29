//! Taste profile: the per-user summary of genre, decade and rating affinity.

use data_loader::ContentItem;
use serde::{Deserialize, Serialize};

/// Most liked genres kept
pub const MAX_LIKED_GENRES: usize = 10;
/// Most disliked genres kept
pub const MAX_DISLIKED_GENRES: usize = 8;
/// Most preferred decades kept
pub const MAX_PREFERRED_DECADES: usize = 6;
/// Rating preference before the user has liked anything
pub const DEFAULT_RATING_PREFERENCE: f32 = 7.0;

/// Evolving taste summary derived from swipe history.
///
/// All three lists are ordered most-recently-relevant first; when a list is
/// full the least recent entry falls off the end. A genre is never in both
/// `liked_genres` and `disliked_genres`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasteProfile {
    pub liked_genres: Vec<String>,
    pub disliked_genres: Vec<String>,
    /// Decade start years, e.g. 1990
    pub preferred_decades: Vec<i32>,
    pub average_rating_preference: f32,
}

impl Default for TasteProfile {
    fn default() -> Self {
        Self {
            liked_genres: Vec::new(),
            disliked_genres: Vec::new(),
            preferred_decades: Vec::new(),
            average_rating_preference: DEFAULT_RATING_PREFERENCE,
        }
    }
}

impl TasteProfile {
    pub fn likes_genre(&self, genre: &str) -> bool {
        self.liked_genres.iter().any(|g| g == genre)
    }

    pub fn dislikes_genre(&self, genre: &str) -> bool {
        self.disliked_genres.iter().any(|g| g == genre)
    }

    pub fn prefers_decade(&self, decade: i32) -> bool {
        self.preferred_decades.contains(&decade)
    }

    /// Whether any preferred decade starts before 2000.
    pub fn has_pre_2000_affinity(&self) -> bool {
        self.preferred_decades.iter().any(|&decade| decade < 2000)
    }

    /// Fold a liked item's genres and decade into the profile.
    pub(crate) fn absorb_like(&mut self, item: &ContentItem) {
        for genre in &item.genres {
            self.disliked_genres.retain(|g| g != genre);
            push_recent(&mut self.liked_genres, genre.clone(), MAX_LIKED_GENRES);
        }
        if let Some(decade) = item.decade() {
            push_recent(&mut self.preferred_decades, decade, MAX_PREFERRED_DECADES);
        }
    }

    /// Move a genre into the disliked list, evicting it from the liked list.
    pub(crate) fn mark_disliked(&mut self, genre: &str) {
        self.liked_genres.retain(|g| g != genre);
        push_recent(
            &mut self.disliked_genres,
            genre.to_string(),
            MAX_DISLIKED_GENRES,
        );
    }

    /// Drop entries beyond the caps and resolve any liked/disliked overlap
    /// in favour of liked. Used on profiles read back from storage.
    pub(crate) fn normalize(&mut self) {
        dedup_in_order(&mut self.liked_genres);
        dedup_in_order(&mut self.disliked_genres);
        dedup_in_order(&mut self.preferred_decades);

        let liked = self.liked_genres.clone();
        self.disliked_genres.retain(|g| !liked.contains(g));

        self.liked_genres.truncate(MAX_LIKED_GENRES);
        self.disliked_genres.truncate(MAX_DISLIKED_GENRES);
        self.preferred_decades.truncate(MAX_PREFERRED_DECADES);

        if !self.average_rating_preference.is_finite() {
            self.average_rating_preference = DEFAULT_RATING_PREFERENCE;
        }
    }
}

/// Insert `value` at the front of an ordered set, moving it if present and
/// dropping the oldest entry past `cap`.
fn push_recent<T: PartialEq>(list: &mut Vec<T>, value: T, cap: usize) {
    list.retain(|existing| *existing != value);
    list.insert(0, value);
    list.truncate(cap);
}

fn dedup_in_order<T: PartialEq + Clone>(list: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(list.len());
    list.retain(|value| {
        if seen.contains(value) {
            false
        } else {
            seen.push(value.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = TasteProfile::default();
        assert!(profile.liked_genres.is_empty());
        assert_eq!(profile.average_rating_preference, 7.0);
        assert!(!profile.has_pre_2000_affinity());
    }

    #[test]
    fn test_absorb_like_moves_genre_to_front_and_caps() {
        let mut profile = TasteProfile::default();
        for i in 0..12 {
            let item = ContentItem::new(i, "x").with_genres([format!("G{i}")]);
            profile.absorb_like(&item);
        }
        assert_eq!(profile.liked_genres.len(), MAX_LIKED_GENRES);
        assert_eq!(profile.liked_genres[0], "G11");
        assert!(!profile.likes_genre("G0"));

        profile.absorb_like(&ContentItem::new(99, "x").with_genres(["G5"]));
        assert_eq!(profile.liked_genres[0], "G5");
        assert_eq!(profile.liked_genres.len(), MAX_LIKED_GENRES);
    }

    #[test]
    fn test_absorb_like_evicts_dislike() {
        let mut profile = TasteProfile::default();
        profile.mark_disliked("Horror");
        profile.absorb_like(&ContentItem::new(1, "x").with_genres(["Horror"]));
        assert!(profile.likes_genre("Horror"));
        assert!(!profile.dislikes_genre("Horror"));
    }

    #[test]
    fn test_mark_disliked_evicts_like() {
        let mut profile = TasteProfile::default();
        profile.absorb_like(&ContentItem::new(1, "x").with_genres(["Drama"]));
        profile.mark_disliked("Drama");
        assert!(!profile.likes_genre("Drama"));
        assert!(profile.dislikes_genre("Drama"));
    }

    #[test]
    fn test_decades_capped() {
        let mut profile = TasteProfile::default();
        for year in [1950, 1960, 1970, 1980, 1990, 2000, 2010] {
            profile.absorb_like(&ContentItem::new(1, "x").with_release_year(year));
        }
        assert_eq!(profile.preferred_decades.len(), MAX_PREFERRED_DECADES);
        assert_eq!(profile.preferred_decades[0], 2010);
        assert!(!profile.prefers_decade(1950));
        assert!(profile.has_pre_2000_affinity());
    }

    #[test]
    fn test_normalize_resolves_overlap() {
        let mut profile = TasteProfile {
            liked_genres: vec!["Action".into(), "Action".into()],
            disliked_genres: vec!["Action".into(), "Horror".into()],
            preferred_decades: vec![],
            average_rating_preference: f32::NAN,
        };
        profile.normalize();
        assert_eq!(profile.liked_genres, vec!["Action".to_string()]);
        assert_eq!(profile.disliked_genres, vec!["Horror".to_string()]);
        assert_eq!(profile.average_rating_preference, DEFAULT_RATING_PREFERENCE);
    }
}
