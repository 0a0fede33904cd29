//! The per-user session: taste profile, interaction log, stats and
//! watchlist, updated together and persisted after every change.

use crate::log::{InteractionLog, SwipeAction};
use crate::preferences::UserPreferences;
use crate::profile::TasteProfile;
use crate::stats::SessionStats;
use crate::store::{MemoryStore, PersistedSession, SessionError, SessionStore};
use crate::watchlist::Watchlist;
use chrono::{DateTime, Utc};
use data_loader::{ActionKind, ContentId, ContentItem, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How many recent passes are inspected before calling a genre disliked
pub const PASS_WINDOW: usize = 3;
/// Passes within the window that must carry a genre to dislike it
pub const PASSES_TO_DISLIKE: usize = 2;

/// One user's mutable recommendation state.
///
/// A `Session` is the single owner of its profile, log, stats and watchlist;
/// callers hold it explicitly and pass it to the engine. Every mutating call
/// writes the full aggregate back to the store. A failed write is logged and
/// otherwise ignored, so mutations never fail.
pub struct Session {
    user_id: UserId,
    state: PersistedSession,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Load the user's session from `store`.
    ///
    /// An empty store gives a fresh session. A corrupt or unreadable blob is
    /// logged and also gives a fresh session.
    pub fn open(user_id: UserId, store: Arc<dyn SessionStore>) -> Self {
        let state = match store.load() {
            Ok(Some(state)) => {
                debug!(user_id, "Loaded persisted session");
                state
            }
            Ok(None) => PersistedSession::default(),
            Err(e) => {
                warn!(user_id, error = %e, "Discarding unreadable session, starting fresh");
                PersistedSession::default()
            }
        };

        let mut session = Self {
            user_id,
            state,
            store,
        };
        session.repair();
        session
    }

    /// A session backed by a `MemoryStore`.
    pub fn in_memory(user_id: UserId) -> Self {
        Self::open(user_id, Arc::new(MemoryStore::new()))
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn profile(&self) -> &TasteProfile {
        &self.state.profile
    }

    pub fn stats(&self) -> SessionStats {
        self.state.stats
    }

    pub fn history(&self) -> &InteractionLog {
        &self.state.history
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.state.watchlist
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.state.preferences
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.last_updated
    }

    pub fn snapshot(&self) -> &PersistedSession {
        &self.state
    }

    /// Ids the user has already acted on: every logged swipe plus the watchlist.
    pub fn seen_ids(&self) -> HashSet<ContentId> {
        self.state
            .history
            .iter()
            .map(|entry| entry.content_id)
            .chain(self.state.watchlist.list().iter().map(|item| item.id))
            .collect()
    }

    /// Record a swipe now.
    pub fn record_swipe(&mut self, item: &ContentItem, action: ActionKind) {
        self.record_swipe_at(item, action, Utc::now());
    }

    /// Record a swipe at a given time.
    ///
    /// ## Algorithm
    /// 1. Append to the log (evicting the oldest entry past the cap) and
    ///    update the counters
    /// 2. Like: absorb genres and decade, recompute the rating preference
    /// 3. Pass: dislike each genre carried by enough recent passes
    /// 4. Save: put the item on the watchlist
    /// 5. Persist
    #[instrument(skip(self, item), fields(user_id = self.user_id, content_id = item.id))]
    pub fn record_swipe_at(&mut self, item: &ContentItem, action: ActionKind, at: DateTime<Utc>) {
        let mut entry = SwipeAction::new(item, action, at);
        if action == ActionKind::SaveForLater {
            entry.created_watchlist_entry = self.state.watchlist.add(item.clone());
        }

        self.state.stats.increment(action);
        if let Some(evicted) = self.state.history.push(entry) {
            self.state.stats.decrement(evicted.action);
        }

        match action {
            ActionKind::Like => {
                self.state.profile.absorb_like(item);
                if let Some(mean) = self.state.history.mean_like_rating() {
                    self.state.profile.average_rating_preference = mean;
                }
            }
            ActionKind::Pass => self.apply_pass(item),
            ActionKind::SaveForLater => {}
        }

        debug!(
            action = %action,
            total_swipes = self.state.stats.total_swipes,
            "Recorded swipe"
        );
        self.persist();
    }

    /// Dislike every genre of `item` that appears in at least
    /// `PASSES_TO_DISLIKE` of the last `PASS_WINDOW` passes (the current one
    /// included), so a single pass never flips a genre.
    fn apply_pass(&mut self, item: &ContentItem) {
        let recent_passes: Vec<&SwipeAction> = self
            .state
            .history
            .recent(ActionKind::Pass, PASS_WINDOW)
            .collect();

        let promoted: Vec<String> = item
            .genres
            .iter()
            .filter(|genre| {
                recent_passes
                    .iter()
                    .filter(|entry| entry.snapshot.has_genre(genre))
                    .count()
                    >= PASSES_TO_DISLIKE
            })
            .cloned()
            .collect();

        for genre in promoted {
            debug!(genre = %genre, "Genre moved to disliked");
            self.state.profile.mark_disliked(&genre);
        }
    }

    /// Revert the most recent swipe.
    ///
    /// Pops the log entry, decrements its counter and, for a save that put
    /// the item on the watchlist, takes it off again. Taste profile changes
    /// made by the swipe are kept. Returns a minimal item rebuilt from the
    /// log snapshot, or `None` when there is nothing to undo.
    #[instrument(skip(self), fields(user_id = self.user_id))]
    pub fn undo_last(&mut self) -> Option<ContentItem> {
        let entry = self.state.history.pop_last()?;

        self.state.stats.decrement(entry.action);
        if entry.action == ActionKind::SaveForLater && entry.created_watchlist_entry {
            self.state.watchlist.remove(entry.content_id);
        }

        info!(content_id = entry.content_id, action = %entry.action, "Undid swipe");
        self.persist();
        Some(entry.to_item())
    }

    /// Remove an item from the watchlist. Absent ids are a no-op.
    pub fn remove_from_watchlist(&mut self, id: ContentId) -> bool {
        let removed = self.state.watchlist.remove(id);
        self.persist();
        removed
    }

    pub fn set_preferences(&mut self, preferences: UserPreferences) {
        self.state.preferences = preferences;
        self.persist();
    }

    /// Drop everything, in memory and in the store.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.state = PersistedSession::default();
        info!(user_id = self.user_id, "Session reset");
        self.store.clear()
    }

    /// Bring a loaded aggregate back within its invariants.
    fn repair(&mut self) {
        self.state.history.enforce_cap();
        self.state.profile.normalize();
        self.state.watchlist.dedup();

        let recounted = SessionStats::from_log(&self.state.history);
        if recounted != self.state.stats {
            debug!(
                stored = ?self.state.stats,
                recounted = ?recounted,
                "Rebuilding session stats from log"
            );
            self.state.stats = recounted;
        }
    }

    fn persist(&mut self) {
        self.state.last_updated = Some(Utc::now());
        if let Err(e) = self.store.save(&self.state) {
            warn!(user_id = self.user_id, error = %e, "Failed to persist session");
        }
    }
}
