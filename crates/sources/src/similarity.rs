//! Peer Similarity - which other users swipe the way this one does
//!
//! ## Algorithm
//! 1. Fetch every action the user has taken
//! 2. For each acted-on item, fetch every peer action on it (concurrently)
//! 3. Per peer, count items both acted on (`common`), items where both
//!    took the same action (`agreements`) and items both liked
//! 4. Peers with fewer than 3 common items score 0
//! 5. similarity = agreements / common + 0.1 * mutual likes, capped at 1.0
//! 6. Drop peers below the minimum similarity
//!
//! Every store call has to succeed for a map to be produced. A partial
//! gather would silently bias the weights, so any failure is returned to
//! the caller, which ranks without collaborative signals.

use crate::error::SourceError;
use crate::peers::PeerSignalStore;
use data_loader::{ActionKind, ContentId, PeerAction, UserId};
use futures::future::join_all;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Peers needed in common before a similarity is trusted
pub const MIN_COMMON_ITEMS: u32 = 3;

/// Bonus per item both users liked
pub const MUTUAL_LIKE_BONUS: f32 = 0.1;

pub const DEFAULT_MIN_SIMILARITY: f32 = 0.3;

/// Peer id -> similarity in [min_similarity, 1.0]
pub type SimilarityMap = HashMap<UserId, f32>;

/// Overlap between the current user and one peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlap {
    pub common: u32,
    pub agreements: u32,
    pub mutual_likes: u32,
}

impl Overlap {
    pub fn similarity(&self) -> f32 {
        if self.common < MIN_COMMON_ITEMS {
            return 0.0;
        }
        let agreement_rate = self.agreements as f32 / self.common as f32;
        (agreement_rate + MUTUAL_LIKE_BONUS * self.mutual_likes as f32).min(1.0)
    }

    fn merge(&mut self, other: Overlap) {
        self.common += other.common;
        self.agreements += other.agreements;
        self.mutual_likes += other.mutual_likes;
    }
}

/// Fold the user's own actions against every peer action on the same
/// items into per-peer overlap counts.
///
/// `peer_actions[i]` holds the store rows for `own[i].content_id`.
pub fn tally_overlaps(
    user_id: UserId,
    own: &[PeerAction],
    peer_actions: &[Vec<PeerAction>],
) -> HashMap<UserId, Overlap> {
    own.par_iter()
        .zip(peer_actions.par_iter())
        .fold(HashMap::new, |mut local: HashMap<UserId, Overlap>, (mine, theirs)| {
            for peer in theirs.iter().filter(|a| a.user_id != user_id) {
                let overlap = local.entry(peer.user_id).or_default();
                overlap.common += 1;
                if peer.action == mine.action {
                    overlap.agreements += 1;
                    if mine.action == ActionKind::Like {
                        overlap.mutual_likes += 1;
                    }
                }
            }
            local
        })
        .reduce(HashMap::new, |mut acc, local| {
            for (peer_id, overlap) in local {
                acc.entry(peer_id).or_default().merge(overlap);
            }
            acc
        })
}

/// Keep the peers whose similarity clears `min_similarity`.
pub fn similarities_from(overlaps: &HashMap<UserId, Overlap>, min_similarity: f32) -> SimilarityMap {
    overlaps
        .iter()
        .filter_map(|(&peer_id, overlap)| {
            let similarity = overlap.similarity();
            (similarity > 0.0 && similarity >= min_similarity).then_some((peer_id, similarity))
        })
        .collect()
}

/// Computes similarity maps against a peer store.
#[derive(Clone)]
pub struct PeerSimilarity {
    store: Arc<dyn PeerSignalStore>,
}

impl PeerSimilarity {
    pub fn new(store: Arc<dyn PeerSignalStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn find_similar_users(
        &self,
        user_id: UserId,
        min_similarity: f32,
    ) -> Result<SimilarityMap, SourceError> {
        let own = self.store.actions_by(user_id).await?;
        if own.is_empty() {
            return Ok(SimilarityMap::new());
        }

        let content_ids: Vec<ContentId> = own.iter().map(|a| a.content_id).collect();
        let lookups = content_ids.iter().map(|&id| self.store.actions_for(id));
        let peer_actions = join_all(lookups)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let overlaps = tally_overlaps(user_id, &own, &peer_actions);
        let similar = similarities_from(&overlaps, min_similarity);

        debug!(
            "User {} overlaps {} peers, {} similar",
            user_id,
            overlaps.len(),
            similar.len()
        );
        Ok(similar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peers::InMemoryPeerStore;

    fn act(user_id: UserId, content_id: ContentId, action: ActionKind) -> PeerAction {
        PeerAction { user_id, content_id, action }
    }

    #[test]
    fn test_overlap_needs_three_common_items() {
        let overlap = Overlap { common: 2, agreements: 2, mutual_likes: 2 };
        assert_eq!(overlap.similarity(), 0.0);
    }

    #[test]
    fn test_overlap_similarity() {
        // 2 of 4 agree, 1 mutual like -> 0.5 + 0.1
        let overlap = Overlap { common: 4, agreements: 2, mutual_likes: 1 };
        assert!((overlap.similarity() - 0.6).abs() < 1e-6);

        let capped = Overlap { common: 3, agreements: 3, mutual_likes: 3 };
        assert_eq!(capped.similarity(), 1.0);
    }

    #[tokio::test]
    async fn test_find_similar_users() {
        use ActionKind::*;
        let store = InMemoryPeerStore::from_actions([
            act(1, 10, Like),
            act(1, 11, Like),
            act(1, 12, Pass),
            // peer 2 agrees on everything
            act(2, 10, Like),
            act(2, 11, Like),
            act(2, 12, Pass),
            // peer 3 disagrees on everything
            act(3, 10, Pass),
            act(3, 11, Pass),
            act(3, 12, Like),
            // peer 4 only overlaps twice
            act(4, 10, Like),
            act(4, 11, Like),
        ]);
        let similarity = PeerSimilarity::new(Arc::new(store));

        let map = similarity.find_similar_users(1, DEFAULT_MIN_SIMILARITY).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&2), Some(&1.0));
        assert!(!map.contains_key(&1));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_an_error() {
        let store = InMemoryPeerStore::from_actions([act(1, 10, ActionKind::Like)]);
        store.set_offline(true);
        let similarity = PeerSimilarity::new(Arc::new(store));

        assert!(similarity.find_similar_users(1, DEFAULT_MIN_SIMILARITY).await.is_err());
    }

    #[tokio::test]
    async fn test_new_user_has_no_peers() {
        let similarity = PeerSimilarity::new(Arc::new(InMemoryPeerStore::new()));
        let map = similarity.find_similar_users(1, DEFAULT_MIN_SIMILARITY).await.unwrap();
        assert!(map.is_empty());
    }
}
