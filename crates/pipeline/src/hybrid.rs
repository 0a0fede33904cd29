//! Hybrid scoring: content match blended with two collaborative signals.
//!
//! ## Terms
//! - **content**: content score minus the 0.5 base, floored at 0
//! - **user-based**: similar peers' actions on the item, weighted by their
//!   similarity (like +1.0, save +0.5, pass -0.5), divided by the total
//!   weight of those peers and clamped to [0, 1]
//! - **item-item**: for each recently liked item, the share of its other
//!   likers who also liked the candidate, averaged over liked items that
//!   have other likers
//!
//! `total = 0.3 * content + 0.4 * user_based + 0.3 * item_item`
//!
//! Peer data for a whole ranking pass is fetched once into `PeerSignals`.
//! If the peer store can't be reached the signals are empty and ranking
//! falls back to content alone.

use crate::content_scorer::{ContentScore, ContentScorer};
use data_loader::{ActionKind, ContentId, ContentItem, PeerAction, UserId};
use futures::future::join_all;
use rayon::prelude::*;
use session::TasteProfile;
use sources::{Candidate, PeerSignalStore, SimilarityMap, SourceError, UserContext};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const CONTENT_WEIGHT: f32 = 0.3;
pub const USER_BASED_WEIGHT: f32 = 0.4;
pub const ITEM_ITEM_WEIGHT: f32 = 0.3;

/// Shown when no term contributed anything
pub const BUILDING_PROFILE: &str = "Building your taste profile";

fn action_value(action: ActionKind) -> f32 {
    match action {
        ActionKind::Like => 1.0,
        ActionKind::SaveForLater => 0.5,
        ActionKind::Pass => -0.5,
    }
}

/// Result of scoring one item.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridScore {
    pub content_score: f32,
    pub user_based_score: f32,
    pub item_item_score: f32,
    pub total: f32,
    pub explanation: Vec<String>,
}

/// Peer-store data for one ranking pass.
#[derive(Debug, Clone, Default)]
pub struct PeerSignals {
    similarities: Arc<SimilarityMap>,
    /// Per sampled liked item, the other users who liked it
    co_likers: Vec<HashSet<UserId>>,
    /// Every peer action on each candidate
    candidate_actions: HashMap<ContentId, Vec<PeerAction>>,
}

impl PeerSignals {
    /// No collaborative data; scoring uses content only.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(
        similarities: Arc<SimilarityMap>,
        co_likers: Vec<HashSet<UserId>>,
        candidate_actions: HashMap<ContentId, Vec<PeerAction>>,
    ) -> Self {
        Self {
            similarities,
            co_likers,
            candidate_actions,
        }
    }

    /// Fetch co-likers of the user's recent likes and every peer action on
    /// the candidates, all concurrently. Any failed lookup fails the gather.
    #[instrument(skip(store, recent_likes, similarities, candidate_ids), fields(candidates = candidate_ids.len()))]
    pub async fn gather(
        store: &dyn PeerSignalStore,
        user_id: UserId,
        recent_likes: &[ContentId],
        similarities: Arc<SimilarityMap>,
        candidate_ids: &[ContentId],
    ) -> Result<Self, SourceError> {
        let liked_lookups = join_all(recent_likes.iter().map(|&id| store.actions_for(id)));
        let candidate_lookups = join_all(candidate_ids.iter().map(|&id| store.actions_for(id)));
        let (liked_rows, candidate_rows) = futures::join!(liked_lookups, candidate_lookups);

        let co_likers = liked_rows
            .into_iter()
            .map(|rows| {
                rows.map(|rows| {
                    rows.into_iter()
                        .filter(|a| a.action == ActionKind::Like && a.user_id != user_id)
                        .map(|a| a.user_id)
                        .collect::<HashSet<_>>()
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut candidate_actions = HashMap::with_capacity(candidate_ids.len());
        for (&id, rows) in candidate_ids.iter().zip(candidate_rows) {
            let rows: Vec<PeerAction> = rows?.into_iter().filter(|a| a.user_id != user_id).collect();
            candidate_actions.insert(id, rows);
        }

        debug!(
            "Gathered peer signals: {} similar peers, {} liked items sampled",
            similarities.len(),
            co_likers.len()
        );
        Ok(Self {
            similarities,
            co_likers,
            candidate_actions,
        })
    }

    fn actions_on(&self, content_id: ContentId) -> &[PeerAction] {
        self.candidate_actions
            .get(&content_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn user_based_score(&self, content_id: ContentId) -> f32 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for action in self.actions_on(content_id) {
            if let Some(&weight) = self.similarities.get(&action.user_id) {
                weighted += weight * action_value(action.action);
                total_weight += weight;
            }
        }
        if total_weight <= 0.0 {
            return 0.0;
        }
        (weighted / total_weight).clamp(0.0, 1.0)
    }

    pub fn item_item_score(&self, content_id: ContentId) -> f32 {
        let likers: HashSet<UserId> = self
            .actions_on(content_id)
            .iter()
            .filter(|a| a.action == ActionKind::Like)
            .map(|a| a.user_id)
            .collect();

        let fractions: Vec<f32> = self
            .co_likers
            .iter()
            .filter(|peers| !peers.is_empty())
            .map(|peers| peers.intersection(&likers).count() as f32 / peers.len() as f32)
            .collect();
        if fractions.is_empty() {
            return 0.0;
        }
        fractions.iter().sum::<f32>() / fractions.len() as f32
    }

    /// Similar peers who liked the item
    pub fn similar_likers(&self, content_id: ContentId) -> usize {
        self.actions_on(content_id)
            .iter()
            .filter(|a| a.action == ActionKind::Like && self.similarities.contains_key(&a.user_id))
            .count()
    }
}

/// Blends content and collaborative signals.
#[derive(Clone, Default)]
pub struct HybridScorer {
    content: ContentScorer,
    store: Option<Arc<dyn PeerSignalStore>>,
}

impl HybridScorer {
    /// Scorer without a peer store: collaborative terms are always zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peer_store(mut self, store: Arc<dyn PeerSignalStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Gather peer signals for a ranking pass. Never fails: an unreachable
    /// store yields empty signals.
    pub async fn gather_signals(
        &self,
        context: &UserContext,
        similarities: Arc<SimilarityMap>,
        candidate_ids: &[ContentId],
    ) -> PeerSignals {
        let Some(store) = &self.store else {
            return PeerSignals::empty();
        };
        match PeerSignals::gather(
            store.as_ref(),
            context.user_id,
            &context.recent_likes,
            similarities,
            candidate_ids,
        )
        .await
        {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Peer signals unavailable, ranking on content only: {}", e);
                PeerSignals::empty()
            }
        }
    }

    /// Score one item against already-gathered signals.
    pub fn score_with(
        &self,
        item: &ContentItem,
        profile: &TasteProfile,
        signals: &PeerSignals,
    ) -> HybridScore {
        let content = self.content.score(item, profile);
        let content_score = content.signal();
        let user_based_score = signals.user_based_score(item.id);
        let item_item_score = signals.item_item_score(item.id);

        let total = (CONTENT_WEIGHT * content_score
            + USER_BASED_WEIGHT * user_based_score
            + ITEM_ITEM_WEIGHT * item_item_score)
            .clamp(0.0, 1.0);

        HybridScore {
            content_score,
            user_based_score,
            item_item_score,
            total,
            explanation: explain(&content, user_based_score, item_item_score, signals.similar_likers(item.id)),
        }
    }

    /// Score a single item, fetching its peer signals first.
    pub async fn score_hybrid(
        &self,
        item: &ContentItem,
        context: &UserContext,
        similarities: Arc<SimilarityMap>,
    ) -> HybridScore {
        let signals = self.gather_signals(context, similarities, &[item.id]).await;
        self.score_with(item, &context.profile, &signals)
    }

    /// Score every candidate in parallel and sort best-first. Ties keep
    /// their incoming order.
    pub fn rank(
        &self,
        candidates: Vec<Candidate>,
        context: &UserContext,
        signals: &PeerSignals,
    ) -> Vec<Candidate> {
        let mut scored: Vec<Candidate> = candidates
            .into_par_iter()
            .map(|mut candidate| {
                let score = self.score_with(&candidate.item, &context.profile, signals);
                candidate.score = score.total;
                candidate.explanation = score.explanation;
                candidate
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

fn explain(content: &ContentScore, user_based: f32, item_item: f32, similar_likers: usize) -> Vec<String> {
    let mut explanation = Vec::new();
    if content.signal() > 0.0 {
        explanation.extend(content.reasons());
    }
    if user_based > 0.0 {
        if similar_likers > 0 {
            explanation.push(format!("Liked by {similar_likers} people with similar taste"));
        } else {
            explanation.push("Saved by people with similar taste".to_string());
        }
    }
    if item_item > 0.0 {
        explanation.push("People who liked what you liked also liked this".to_string());
    }
    if explanation.is_empty() {
        explanation.push(BUILDING_PROFILE.to_string());
    }
    explanation
}
