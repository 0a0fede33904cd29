//! Simple test harness for the recommendation engine.
//!
//! Loads a dataset, plays a scripted user through cold start into
//! personalized ranking, and logs every batch.
//!
//! Usage: engine [DATA_DIR]   (default: data/demo)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::{ActionKind, DataIndex};
use engine::{EngineConfig, RecommendationEngine, RecommendationOutcome};
use session::Session;
use sources::{IndexedCatalog, InMemoryPeerStore};

/// Id the scripted user swipes as
const DEMO_USER: u64 = 9_999;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,engine=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting engine test harness");

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/demo"));
    let data_index = Arc::new(
        DataIndex::load_from_dir(&data_dir)
            .with_context(|| format!("Failed to load dataset from {}", data_dir.display()))?,
    );

    let peers = Arc::new(InMemoryPeerStore::from_index(&data_index));
    let engine = RecommendationEngine::new(
        Arc::new(IndexedCatalog::new(data_index.clone())),
        EngineConfig::default(),
    )
    .with_peer_store(peers);

    let mut session = Session::in_memory(DEMO_USER);
    let mut page = 1;

    // Like anything with a genre in common with the first card, pass the rest
    for round in 1..=4 {
        let outcome = engine.recommend(&session, page).await;
        let recommendations = match outcome {
            RecommendationOutcome::Ready { recommendations, next_page } => {
                page = next_page;
                recommendations
            }
            RecommendationOutcome::Exhausted => {
                info!("Catalog exhausted after {} rounds", round - 1);
                break;
            }
        };

        info!(
            "Round {} ({} swipes so far): {} recommendations",
            round,
            session.stats().total_swipes,
            recommendations.len()
        );
        for (i, rec) in recommendations.iter().enumerate() {
            info!(
                "{}. {} ({}) - Score: {:.3} [{:?}]",
                i + 1,
                rec.item.title,
                rec.item
                    .release_year()
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "????".to_string()),
                rec.score,
                rec.source
            );
            info!("   {}", rec.explanation.join("; "));
        }

        let anchor = recommendations
            .first()
            .map(|rec| rec.item.genres.clone())
            .unwrap_or_default();
        for rec in &recommendations {
            let action = if rec.item.genres.iter().any(|g| anchor.contains(g)) {
                ActionKind::Like
            } else {
                ActionKind::Pass
            };
            engine.record_swipe(&mut session, &rec.item, action).await;
        }
    }

    let profile = session.profile();
    info!("Liked genres: {}", profile.liked_genres.join(", "));
    info!("Disliked genres: {}", profile.disliked_genres.join(", "));

    Ok(())
}
