//! Short-lived per-user cache of similarity maps.
//!
//! A map costs one store round-trip per acted-on item, and a ranking pass
//! reuses it for every candidate. Entries carry their own expiry instant;
//! callers pass `now` so expiry can be driven from tests.

use crate::similarity::SimilarityMap;
use data_loader::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_SIMILARITY_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedSimilarity {
    map: Arc<SimilarityMap>,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct SimilarityCache {
    ttl: Duration,
    entries: HashMap<UserId, CachedSimilarity>,
}

impl Default for SimilarityCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_TTL)
    }
}

impl SimilarityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached map, if one exists and hasn't expired at `now`.
    pub fn get(&self, user_id: UserId, now: Instant) -> Option<Arc<SimilarityMap>> {
        self.entries
            .get(&user_id)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| Arc::clone(&entry.map))
    }

    pub fn insert(&mut self, user_id: UserId, map: SimilarityMap, now: Instant) -> Arc<SimilarityMap> {
        let map = Arc::new(map);
        self.entries.insert(
            user_id,
            CachedSimilarity {
                map: Arc::clone(&map),
                expires_at: now + self.ttl,
            },
        );
        map
    }

    /// Drop one user's map. Returns whether one was cached.
    pub fn invalidate(&mut self, user_id: UserId) -> bool {
        self.entries.remove(&user_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every entry that has expired at `now`.
    pub fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| now < entry.expires_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> SimilarityMap {
        SimilarityMap::from([(2, 0.8), (3, 0.4)])
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let start = Instant::now();
        let mut cache = SimilarityCache::new(Duration::from_secs(300));
        cache.insert(1, sample_map(), start);

        assert!(cache.get(1, start).is_some());
        assert!(cache.get(1, start + Duration::from_secs(299)).is_some());
        assert!(cache.get(1, start + Duration::from_secs(300)).is_none());
        assert!(cache.get(2, start).is_none());
    }

    #[test]
    fn test_invalidate() {
        let now = Instant::now();
        let mut cache = SimilarityCache::default();
        cache.insert(1, sample_map(), now);

        assert!(cache.invalidate(1));
        assert!(!cache.invalidate(1));
        assert!(cache.get(1, now).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let start = Instant::now();
        let mut cache = SimilarityCache::new(Duration::from_secs(10));
        cache.insert(1, sample_map(), start);
        cache.insert(2, sample_map(), start + Duration::from_secs(8));

        cache.purge_expired(start + Duration::from_secs(12));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(2, start + Duration::from_secs(12)).is_some());
    }
}
