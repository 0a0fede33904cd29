//! # Session Crate
//!
//! Per-user recommendation state and its persistence.
//!
//! ## Components
//!
//! - **profile**: `TasteProfile`, the liked/disliked genres, preferred
//!   decades and rating preference learned from swipes
//! - **log**: bounded `InteractionLog` of `SwipeAction`s with content snapshots
//! - **stats**: `SessionStats` counters mirroring the log
//! - **watchlist**: saved-for-later items
//! - **store**: `PersistedSession` and the `SessionStore` backends
//! - **session**: `Session`, which ties the above together
//!
//! ## Example Usage
//!
//! ```ignore
//! use session::{JsonFileStore, Session};
//! use std::sync::Arc;
//!
//! let mut session = Session::open(1, Arc::new(JsonFileStore::new("session.json")));
//! session.record_swipe(&item, ActionKind::Like);
//! if let Some(undone) = session.undo_last() {
//!     println!("Put {} back in the deck", undone.title);
//! }
//! ```

pub mod log;
pub mod preferences;
pub mod profile;
pub mod session;
pub mod stats;
pub mod store;
pub mod watchlist;

pub use log::{ContentSnapshot, InteractionLog, MAX_LOG_ENTRIES, SwipeAction};
pub use preferences::UserPreferences;
pub use profile::TasteProfile;
pub use session::Session;
pub use stats::SessionStats;
pub use store::{JsonFileStore, MemoryStore, PersistedSession, SessionError, SessionStore};
pub use watchlist::Watchlist;
