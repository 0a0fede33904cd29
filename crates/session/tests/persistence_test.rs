//! Integration tests for session persistence.
//!
//! These tests check that a session survives a reopen, and that bad stored
//! data degrades to a fresh session rather than an error.

use data_loader::{ActionKind, ContentItem};
use session::{JsonFileStore, MemoryStore, Session, SessionStats, SessionStore};
use std::sync::Arc;

fn item(id: u64, genre: &str) -> ContentItem {
    ContentItem::new(id, format!("Item {id}"))
        .with_genres([genre])
        .with_release_year(2012)
        .with_rating(7.4)
}

#[test]
fn test_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let mut session = Session::open(1, Arc::new(JsonFileStore::new(&path)));
        session.record_swipe(&item(1, "Drama"), ActionKind::Like);
        session.record_swipe(&item(2, "Crime"), ActionKind::SaveForLater);
        session.record_swipe(&item(3, "Horror"), ActionKind::Pass);
    }

    let reopened = Session::open(1, Arc::new(JsonFileStore::new(&path)));
    assert_eq!(reopened.history().len(), 3);
    assert_eq!(reopened.stats().total_swipes, 3);
    assert!(reopened.profile().likes_genre("Drama"));
    assert!(reopened.watchlist().contains(2));
    assert!(reopened.last_updated().is_some());
}

#[test]
fn test_every_mutation_is_written() {
    let store = Arc::new(MemoryStore::new());
    let mut session = Session::open(1, store.clone());

    session.record_swipe(&item(1, "Drama"), ActionKind::SaveForLater);
    assert_eq!(store.load().unwrap().unwrap().watchlist.len(), 1);

    session.remove_from_watchlist(1);
    assert_eq!(store.load().unwrap().unwrap().watchlist.len(), 0);

    session.undo_last();
    assert_eq!(store.load().unwrap().unwrap().history.len(), 0);
}

#[test]
fn test_corrupt_blob_starts_fresh() {
    let store = Arc::new(MemoryStore::with_blob("{\"profile\": [1, 2"));
    let mut session = Session::open(1, store.clone());

    assert!(session.history().is_empty());
    assert_eq!(session.profile().average_rating_preference, 7.0);

    // The next write replaces the corrupt blob
    session.record_swipe(&item(1, "Drama"), ActionKind::Like);
    assert!(store.load().unwrap().is_some());
}

#[test]
fn test_stats_rebuilt_when_missing() {
    let mut original = Session::in_memory(1);
    original.record_swipe(&item(1, "Drama"), ActionKind::Like);
    original.record_swipe(&item(2, "Drama"), ActionKind::Pass);

    let mut blob: serde_json::Value =
        serde_json::from_str(&original.snapshot().to_json().unwrap()).unwrap();
    blob.as_object_mut().unwrap().remove("stats");

    let reopened = Session::open(1, Arc::new(MemoryStore::with_blob(blob.to_string())));
    assert_eq!(
        reopened.stats(),
        SessionStats { total_swipes: 2, likes_count: 1, dislikes_count: 1, saved_count: 0 }
    );
}

#[test]
fn test_reset_clears_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mut session = Session::open(1, Arc::new(JsonFileStore::new(&path)));
    session.record_swipe(&item(1, "Drama"), ActionKind::Like);
    assert!(path.exists());

    session.reset().unwrap();
    assert!(!path.exists());
    assert!(session.history().is_empty());
    assert!(session.profile().liked_genres.is_empty());
}

#[test]
fn test_partial_entries_keep_the_rest() {
    let blob = r#"{
        "profile": {"liked_genres": ["Drama"]},
        "watchlist": [{"id": 5}, {"title": "No id"}],
        "history": [
            {"content_id": 3, "action": "like", "snapshot": {"genres": ["Drama"]}},
            {"content_id": 4},
            {"action": "pass"}
        ]
    }"#;

    let session = Session::open(1, Arc::new(MemoryStore::with_blob(blob)));

    assert_eq!(session.profile().liked_genres, vec!["Drama".to_string()]);
    assert_eq!(session.watchlist().len(), 1);
    assert!(session.watchlist().contains(5));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().last().unwrap().content_id, 3);
    assert_eq!(session.stats().likes_count, 1);
}
