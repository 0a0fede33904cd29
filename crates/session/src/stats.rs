//! Running swipe counters.

use crate::log::InteractionLog;
use data_loader::ActionKind;
use serde::{Deserialize, Serialize};

/// Per-action counts over the interaction log, kept up to date on every
/// append, eviction and undo so reads are O(1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total_swipes: u32,
    pub likes_count: u32,
    pub dislikes_count: u32,
    pub saved_count: u32,
}

impl SessionStats {
    /// Recount from scratch.
    pub fn from_log(log: &InteractionLog) -> Self {
        let mut stats = Self::default();
        for entry in log.iter() {
            stats.increment(entry.action);
        }
        stats
    }

    pub(crate) fn increment(&mut self, action: ActionKind) {
        self.total_swipes += 1;
        *self.counter(action) += 1;
    }

    pub(crate) fn decrement(&mut self, action: ActionKind) {
        self.total_swipes = self.total_swipes.saturating_sub(1);
        let counter = self.counter(action);
        *counter = counter.saturating_sub(1);
    }

    fn counter(&mut self, action: ActionKind) -> &mut u32 {
        match action {
            ActionKind::Like => &mut self.likes_count,
            ActionKind::Pass => &mut self.dislikes_count,
            ActionKind::SaveForLater => &mut self.saved_count,
        }
    }
}
