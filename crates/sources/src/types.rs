//! Types passed between candidate sources, the pipeline and the engine.

use data_loader::{ContentId, ContentItem, UserId};
use session::{TasteProfile, UserPreferences};
use std::collections::HashSet;

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// High-quality pool served during cold start
    Curated,
    /// Regular filtered catalog query
    Discover,
}

/// A catalog item on its way through the pipeline.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: ContentItem,
    pub source: CandidateSource,
    /// Ranking score in [0, 1]; zero until scored
    pub score: f32,
    /// Reasons shown to the user alongside the card
    pub explanation: Vec<String>,
}

impl Candidate {
    pub fn new(item: ContentItem, source: CandidateSource) -> Self {
        Self {
            item,
            source,
            score: 0.0,
            explanation: Vec::new(),
        }
    }

    pub fn content_id(&self) -> ContentId {
        self.item.id
    }
}

/// Everything about the user a ranking pass needs, gathered once up front.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: UserId,
    pub profile: TasteProfile,
    pub preferences: UserPreferences,
    /// Already acted on; never recommended again
    pub seen: HashSet<ContentId>,
    /// Most recently liked items, newest first
    pub recent_likes: Vec<ContentId>,
    pub total_swipes: u32,
}

impl UserContext {
    /// Context for a user with no history.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            profile: TasteProfile::default(),
            preferences: UserPreferences::default(),
            seen: HashSet::new(),
            recent_likes: Vec::new(),
            total_swipes: 0,
        }
    }
}
