//! Integration tests for the pipeline.
//!
//! These tests run a full personalized ranking pass: session-built
//! context, filters, peer similarity, hybrid scoring and diversity.

use data_loader::{ActionKind, ContentItem, PeerAction};
use pipeline::filters::*;
use pipeline::{FilterPipeline, HybridScorer};
use session::Session;
use sources::user_context::{build_user_context, DEFAULT_LIKED_SAMPLE};
use sources::{
    Candidate, CandidateSource, InMemoryPeerStore, PeerSignalStore, PeerSimilarity, UserContext,
    DEFAULT_MIN_SIMILARITY,
};
use std::sync::Arc;

fn poster_item(id: u64, genre: &str) -> ContentItem {
    ContentItem::new(id, format!("Title {id}"))
        .with_genres([genre])
        .with_language("en")
        .with_poster(format!("/{id}.jpg"))
}

async fn create_test_setup() -> (Arc<InMemoryPeerStore>, UserContext, Vec<Candidate>) {
    let store = Arc::new(InMemoryPeerStore::new());
    let mut session = Session::in_memory(1);

    // User 1 likes three Action titles
    for id in 1..=3 {
        let item = poster_item(id, "Action").with_rating(8.0);
        session.record_swipe(&item, ActionKind::Like);
        store
            .record_action(PeerAction { user_id: 1, content_id: id, action: ActionKind::Like })
            .await
            .unwrap();
    }

    // Peer 2 agrees on all three and likes 10; peer 3 shares one and likes 11
    let peer_rows = [(2, 1), (2, 2), (2, 3), (2, 10), (3, 1), (3, 11)];
    for (user_id, content_id) in peer_rows {
        store
            .record_action(PeerAction { user_id, content_id, action: ActionKind::Like })
            .await
            .unwrap();
    }

    let context = build_user_context(&session, DEFAULT_LIKED_SAMPLE);
    let candidates = vec![
        Candidate::new(poster_item(1, "Action"), CandidateSource::Discover), // seen
        Candidate::new(poster_item(10, "Drama"), CandidateSource::Discover),
        Candidate::new(poster_item(11, "Action"), CandidateSource::Discover),
        Candidate::new(ContentItem::new(12, "No poster"), CandidateSource::Discover),
        Candidate::new(poster_item(13, "Comedy"), CandidateSource::Discover),
    ];

    (store, context, candidates)
}

fn ids(candidates: &[Candidate]) -> Vec<u64> {
    candidates.iter().map(Candidate::content_id).collect()
}

#[tokio::test]
async fn test_full_ranking_pass() {
    let (store, context, candidates) = create_test_setup().await;

    let filtered = FilterPipeline::new()
        .add_filter(AlreadySeenFilter)
        .add_filter(DisplayAssetsFilter)
        .apply(candidates, &context)
        .unwrap();
    assert_eq!(ids(&filtered), vec![10, 11, 13]);

    let similarities = PeerSimilarity::new(store.clone())
        .find_similar_users(context.user_id, DEFAULT_MIN_SIMILARITY)
        .await
        .unwrap();
    assert_eq!(similarities.len(), 1);
    assert!(similarities.contains_key(&2));

    let scorer = HybridScorer::new().with_peer_store(store);
    let candidate_ids = ids(&filtered);
    let signals = scorer
        .gather_signals(&context, Arc::new(similarities), &candidate_ids)
        .await;
    let ranked = scorer.rank(filtered, &context, &signals);

    // 10 is backed by the similar peer, 11 only by genre and a weak co-like
    assert_eq!(ids(&ranked), vec![10, 11, 13]);
    assert!((ranked[0].score - 0.65).abs() < 1e-4);
    assert_eq!(ranked[2].score, 0.0);

    let picked = DiversityFilter::default().select(ranked);
    assert_eq!(picked.len(), 3);
    assert!(picked.iter().all(|c| !c.explanation.is_empty()));
}

#[tokio::test]
async fn test_ranking_survives_peer_outage() {
    let (store, context, candidates) = create_test_setup().await;
    store.set_offline(true);

    let filtered = FilterPipeline::new()
        .add_filter(AlreadySeenFilter)
        .add_filter(DisplayAssetsFilter)
        .apply(candidates, &context)
        .unwrap();

    let similarity = PeerSimilarity::new(store.clone())
        .find_similar_users(context.user_id, DEFAULT_MIN_SIMILARITY)
        .await;
    assert!(similarity.is_err());

    let scorer = HybridScorer::new().with_peer_store(store);
    let candidate_ids = ids(&filtered);
    let signals = scorer.gather_signals(&context, Arc::default(), &candidate_ids).await;
    let ranked = scorer.rank(filtered, &context, &signals);

    // Content alone: only the Action title has any signal
    assert_eq!(ranked[0].content_id(), 11);
    assert!((ranked[0].score - 0.12).abs() < 1e-4);
    assert!(ranked[1..].iter().all(|c| c.score == 0.0));
}
