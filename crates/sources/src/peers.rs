//! Peer Signal Store - every user's actions, shared across users
//!
//! The real store is an external shared database. The engine only issues
//! the calls below; rows are never cached beyond one query.

use crate::error::SourceError;
use async_trait::async_trait;
use data_loader::{ContentId, DataIndex, PeerAction, UserId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read/append access to the shared action store.
#[async_trait]
pub trait PeerSignalStore: Send + Sync {
    /// Every user's action on one content item.
    async fn actions_for(&self, content_id: ContentId) -> Result<Vec<PeerAction>, SourceError>;

    /// Every action one user has taken.
    async fn actions_by(&self, user_id: UserId) -> Result<Vec<PeerAction>, SourceError>;

    /// Append (or replace) the current user's own action.
    async fn record_action(&self, action: PeerAction) -> Result<(), SourceError>;

    /// Drop the user's action on an item. Absent rows are a no-op.
    async fn retract_action(&self, user_id: UserId, content_id: ContentId) -> Result<(), SourceError>;
}

/// Peer store held in process memory, seeded from a dataset.
///
/// Can be switched offline to exercise the degraded scoring paths.
#[derive(Debug, Default)]
pub struct InMemoryPeerStore {
    table: RwLock<DataIndex>,
    offline: AtomicBool,
}

impl InMemoryPeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every action out of a loaded dataset.
    pub fn from_index(data_index: &DataIndex) -> Self {
        Self::from_actions(data_index.actions().copied())
    }

    pub fn from_actions(actions: impl IntoIterator<Item = PeerAction>) -> Self {
        let mut table = DataIndex::new();
        for action in actions {
            table.insert_action(action);
        }
        Self {
            table: RwLock::new(table),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every call fail with `PeerStoreUnavailable` (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), SourceError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(SourceError::PeerStoreUnavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PeerSignalStore for InMemoryPeerStore {
    async fn actions_for(&self, content_id: ContentId) -> Result<Vec<PeerAction>, SourceError> {
        self.check_online()?;
        Ok(self.table.read().get_content_actions(content_id).to_vec())
    }

    async fn actions_by(&self, user_id: UserId) -> Result<Vec<PeerAction>, SourceError> {
        self.check_online()?;
        Ok(self.table.read().get_user_actions(user_id).to_vec())
    }

    async fn record_action(&self, action: PeerAction) -> Result<(), SourceError> {
        self.check_online()?;
        self.table.write().insert_action(action);
        Ok(())
    }

    async fn retract_action(&self, user_id: UserId, content_id: ContentId) -> Result<(), SourceError> {
        self.check_online()?;
        self.table.write().remove_action(user_id, content_id);
        Ok(())
    }
}
