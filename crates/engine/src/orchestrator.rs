//! # Recommendation Engine
//!
//! This module coordinates a ranking pass:
//! 1. Build the user context from the session
//! 2. Fetch a catalog page (one query per declared language, concurrently)
//! 3. Drop seen items and items without display assets
//! 4. Cold start: serve the curated pool as-is
//! 5. Otherwise: find similar peers (cached), gather peer signals,
//!    hybrid-score, sort and diversify
//! 6. If a page had nothing new, move on to the next one, a bounded
//!    number of times
//!
//! Catalog and peer-store failures never surface as errors. A failed
//! catalog fetch yields an empty result; a failed peer lookup drops the
//! collaborative terms for that pass.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use data_loader::{ActionKind, ContentItem, PeerAction, UserId};
use pipeline::filters::{AlreadySeenFilter, DisplayAssetsFilter, DiversityFilter};
use pipeline::{FilterPipeline, HybridScorer};
use session::{Session, SessionError};
use sources::user_context::build_user_context;
use sources::{
    Candidate, CandidateSource, CatalogGateway, CatalogPage, DiscoverQuery, PeerSignalStore,
    PeerSimilarity, QualityFloor, SimilarityCache, SimilarityMap, SourceError, UserContext,
};

use crate::config::EngineConfig;

/// Shown on curated cards before there is any taste signal
pub const CURATED_EXPLANATION: &str = "Highly rated pick to get you started";

/// A card ready to be shown
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub item: ContentItem,
    pub score: f32,
    pub source: CandidateSource,
    pub explanation: Vec<String>,
}

impl From<Candidate> for Recommendation {
    fn from(candidate: Candidate) -> Self {
        Self {
            item: candidate.item,
            score: candidate.score,
            source: candidate.source,
            explanation: candidate.explanation,
        }
    }
}

/// Result of asking for more cards.
#[derive(Debug, Clone)]
pub enum RecommendationOutcome {
    /// Cards to show (possibly none, after a transient failure) and the
    /// catalog page to ask for next
    Ready {
        recommendations: Vec<Recommendation>,
        next_page: u32,
    },
    /// The catalog has nothing new left for this user
    Exhausted,
}

impl RecommendationOutcome {
    pub fn recommendations(&self) -> &[Recommendation] {
        match self {
            RecommendationOutcome::Ready { recommendations, .. } => recommendations,
            RecommendationOutcome::Exhausted => &[],
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RecommendationOutcome::Exhausted)
    }
}

/// Main engine that coordinates the recommendation pipeline
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogGateway>,
    peers: Option<Arc<dyn PeerSignalStore>>,
    scorer: HybridScorer,
    filter_pipeline: Arc<FilterPipeline>,
    diversity: Arc<DiversityFilter>,
    similarity_cache: Arc<Mutex<SimilarityCache>>,
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine without a peer store: rankings use content only
    pub fn new(catalog: Arc<dyn CatalogGateway>, config: EngineConfig) -> Self {
        let filter_pipeline = Arc::new(
            FilterPipeline::new()
                .add_filter(AlreadySeenFilter)
                .add_filter(DisplayAssetsFilter),
        );
        let diversity = Arc::new(DiversityFilter::new(
            config.max_per_genre,
            config.max_per_language,
            config.limit,
        ));
        let similarity_cache = Arc::new(Mutex::new(SimilarityCache::new(config.similarity_ttl())));

        Self {
            catalog,
            peers: None,
            scorer: HybridScorer::new(),
            filter_pipeline,
            diversity,
            similarity_cache,
            config,
        }
    }

    /// Attach the shared peer store used for similarity, scoring and
    /// swipe mirroring
    pub fn with_peer_store(mut self, peers: Arc<dyn PeerSignalStore>) -> Self {
        self.scorer = self.scorer.with_peer_store(Arc::clone(&peers));
        self.peers = Some(peers);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommendations for the session's user starting at `page` (1-based)
    pub async fn recommend(&self, session: &Session, page: u32) -> RecommendationOutcome {
        let context = build_user_context(session, self.config.liked_sample);
        self.get_recommendations(&context, page).await
    }

    /// Main entry point: one ranking pass over a detached user context
    #[instrument(skip(self, context), fields(user_id = context.user_id, swipes = context.total_swipes))]
    pub async fn get_recommendations(&self, context: &UserContext, page: u32) -> RecommendationOutcome {
        let start_time = Instant::now();
        let cold_start = self.is_cold_start(context);
        let mut page = page.max(1);

        for attempt in 0..=self.config.max_page_retries {
            let fetched = match self.fetch_page(context, page, cold_start).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Catalog fetch failed on page {}: {}", page, e);
                    return RecommendationOutcome::Ready {
                        recommendations: Vec::new(),
                        next_page: page,
                    };
                }
            };
            let has_more = fetched.has_more;

            let source = if cold_start {
                CandidateSource::Curated
            } else {
                CandidateSource::Discover
            };
            let candidates: Vec<Candidate> = fetched
                .items
                .into_iter()
                .map(|item| Candidate::new(item, source))
                .collect();
            let fresh = self.apply_filters(candidates, context);

            if !fresh.is_empty() {
                let picked = if cold_start {
                    self.curated(fresh)
                } else {
                    self.personalized(context, fresh).await
                };
                info!(
                    "Selected {} recommendations for user {} from page {} in {:.2?}",
                    picked.len(),
                    context.user_id,
                    page,
                    start_time.elapsed()
                );
                return RecommendationOutcome::Ready {
                    recommendations: picked.into_iter().map(Recommendation::from).collect(),
                    next_page: page + 1,
                };
            }

            if !has_more {
                break;
            }
            debug!("Page {} had nothing new (attempt {}), trying next page", page, attempt + 1);
            page += 1;
        }

        info!("Catalog exhausted for user {}", context.user_id);
        RecommendationOutcome::Exhausted
    }

    pub fn is_cold_start(&self, context: &UserContext) -> bool {
        context.total_swipes < self.config.cold_start_threshold
    }

    /// Record a swipe in the session and mirror it to the peer store
    ///
    /// Mirroring failures are logged and otherwise ignored.
    pub async fn record_swipe(&self, session: &mut Session, item: &ContentItem, action: ActionKind) {
        session.record_swipe(item, action);

        if let Some(peers) = &self.peers {
            let row = PeerAction {
                user_id: session.user_id(),
                content_id: item.id,
                action,
            };
            if let Err(e) = peers.record_action(row).await {
                warn!("Failed to mirror swipe on {} to peer store: {}", item.id, e);
            }
        }
    }

    /// Undo the most recent swipe and take its mirrored row back out of the
    /// peer store.
    ///
    /// If the log still holds an older swipe on the same item, that swipe is
    /// mirrored again instead, so the store matches the log. Peer store
    /// failures are logged and otherwise ignored.
    pub async fn undo_last(&self, session: &mut Session) -> Option<ContentItem> {
        let undone = session.undo_last()?;
        let user_id = session.user_id();

        if let Some(peers) = &self.peers {
            let earlier = session
                .history()
                .iter()
                .rev()
                .find(|entry| entry.content_id == undone.id)
                .map(|entry| entry.action);
            let result = match earlier {
                Some(action) => {
                    peers
                        .record_action(PeerAction {
                            user_id,
                            content_id: undone.id,
                            action,
                        })
                        .await
                }
                None => peers.retract_action(user_id, undone.id).await,
            };
            if let Err(e) = result {
                warn!("Failed to retract swipe on {} from peer store: {}", undone.id, e);
            }
        }

        self.invalidate_similarity(user_id);
        Some(undone)
    }

    /// Clear the session and forget its cached similarity map
    pub fn reset(&self, session: &mut Session) -> Result<(), SessionError> {
        self.invalidate_similarity(session.user_id());
        session.reset()
    }

    /// Drop a user's cached similarity map so the next pass recomputes it
    pub fn invalidate_similarity(&self, user_id: UserId) {
        if self.similarity_cache.lock().invalidate(user_id) {
            debug!("Invalidated similarity cache for user {}", user_id);
        }
    }

    fn query(&self, context: &UserContext, page: u32, cold_start: bool) -> DiscoverQuery {
        let prefs = &context.preferences;
        let floor: QualityFloor = if cold_start {
            self.config.curated_floor.into()
        } else {
            self.config.steady_floor.into()
        };
        DiscoverQuery::new(prefs.content_type)
            .with_genres(prefs.genres.clone())
            .with_year_range(prefs.year_range)
            .with_page(page)
            .with_quality_floor(floor)
    }

    /// Fetch one page, querying each declared language concurrently.
    ///
    /// Results are merged in language order and deduplicated by id. Any
    /// failed query fails the whole page.
    async fn fetch_page(
        &self,
        context: &UserContext,
        page: u32,
        cold_start: bool,
    ) -> Result<CatalogPage, SourceError> {
        let base = self.query(context, page, cold_start);
        let languages = &context.preferences.languages;

        if languages.len() <= 1 {
            return self
                .catalog
                .discover(&base.with_languages(languages.clone()))
                .await;
        }

        let queries: Vec<DiscoverQuery> = languages
            .iter()
            .map(|language| base.clone().with_languages(vec![language.clone()]))
            .collect();
        let pages = join_all(queries.iter().map(|query| self.catalog.discover(query)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen_ids = HashSet::new();
        let mut merged = CatalogPage::default();
        for page in pages {
            merged.has_more |= page.has_more;
            merged
                .items
                .extend(page.items.into_iter().filter(|item| seen_ids.insert(item.id)));
        }
        Ok(merged)
    }

    fn apply_filters(&self, candidates: Vec<Candidate>, context: &UserContext) -> Vec<Candidate> {
        let total = candidates.len();
        match self.filter_pipeline.apply(candidates, context) {
            Ok(filtered) => {
                debug!("Filtering complete, {} of {} candidates remain", filtered.len(), total);
                filtered
            }
            Err(e) => {
                warn!("Filter pipeline failed: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Cold start: the curated pool in catalog order, no personalization
    fn curated(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .take(self.config.limit)
            .map(|mut candidate| {
                candidate.score = (candidate.item.rating / 10.0).clamp(0.0, 1.0);
                candidate.explanation = vec![CURATED_EXPLANATION.to_string()];
                candidate
            })
            .collect()
    }

    async fn personalized(&self, context: &UserContext, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let similarities = self.similarities_for(context.user_id).await;
        let candidate_ids: Vec<_> = candidates.iter().map(Candidate::content_id).collect();
        let signals = self
            .scorer
            .gather_signals(context, similarities, &candidate_ids)
            .await;

        let ranked = self.scorer.rank(candidates, context, &signals);
        self.diversity.select(ranked)
    }

    /// Cached similarity map, recomputed when missing or expired.
    ///
    /// A failed computation yields an empty map and is not cached.
    async fn similarities_for(&self, user_id: UserId) -> Arc<SimilarityMap> {
        let Some(peers) = &self.peers else {
            return Arc::default();
        };

        if let Some(cached) = self.similarity_cache.lock().get(user_id, Instant::now()) {
            debug!("Similarity cache hit for user {}", user_id);
            return cached;
        }

        match PeerSimilarity::new(Arc::clone(peers))
            .find_similar_users(user_id, self.config.min_similarity)
            .await
        {
            Ok(map) => {
                let now = Instant::now();
                let mut cache = self.similarity_cache.lock();
                cache.purge_expired(now);
                cache.insert(user_id, map, now)
            }
            Err(e) => {
                warn!("Peer similarity unavailable for user {}: {}", user_id, e);
                Arc::default()
            }
        }
    }
}
