//! Property tests over arbitrary swipe sequences.

use data_loader::{ActionKind, ContentItem};
use proptest::prelude::*;
use session::{MAX_LOG_ENTRIES, Session, SessionStats};

const GENRES: &[&str] = &[
    "Action", "Comedy", "Drama", "Horror", "Romance", "Thriller", "Animation", "Crime",
    "Documentary", "Fantasy", "Mystery", "SciFi",
];

fn arb_action() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        Just(ActionKind::Like),
        Just(ActionKind::Pass),
        Just(ActionKind::SaveForLater),
    ]
}

fn arb_item() -> impl Strategy<Value = ContentItem> {
    (
        0u64..40,
        prop::collection::vec(prop::sample::select(GENRES), 0..4),
        proptest::option::of(1920i32..2030),
        0.0f32..=10.0,
    )
        .prop_map(|(id, genres, year, rating)| {
            let mut item = ContentItem::new(id, "generated")
                .with_genres(genres)
                .with_rating(rating);
            if let Some(year) = year {
                item = item.with_release_year(year);
            }
            item
        })
}

proptest! {
    #[test]
    fn genre_never_both_liked_and_disliked(
        swipes in prop::collection::vec((arb_item(), arb_action()), 0..120)
    ) {
        let mut session = Session::in_memory(1);
        for (item, action) in &swipes {
            session.record_swipe(item, *action);

            let profile = session.profile();
            for genre in &profile.liked_genres {
                prop_assert!(!profile.disliked_genres.contains(genre));
            }
            prop_assert!(profile.liked_genres.len() <= 10);
            prop_assert!(profile.disliked_genres.len() <= 8);
            prop_assert!(profile.preferred_decades.len() <= 6);
        }
    }

    #[test]
    fn stats_always_match_log(
        swipes in prop::collection::vec((arb_item(), arb_action()), 0..130),
        undos in 0usize..5,
    ) {
        let mut session = Session::in_memory(1);
        for (item, action) in &swipes {
            session.record_swipe(item, *action);
        }
        for _ in 0..undos {
            session.undo_last();
        }
        prop_assert!(session.history().len() <= MAX_LOG_ENTRIES);
        prop_assert_eq!(session.stats(), SessionStats::from_log(session.history()));
    }
}
