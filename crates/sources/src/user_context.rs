//! Build a UserContext from a session.
//!
//! The context is a detached copy, so a ranking pass keeps seeing the same
//! profile even if the session records more swipes while the pass awaits
//! catalog or peer queries.

use crate::types::UserContext;
use session::Session;

/// Liked items sampled for item-item association by default
pub const DEFAULT_LIKED_SAMPLE: usize = 10;

/// Build a UserContext from a session
///
/// Gathers:
/// - Taste profile and declared preferences
/// - Seen ids (log + watchlist)
/// - The `liked_sample` most recent likes
/// - Total swipes, which decides cold start
pub fn build_user_context(session: &Session, liked_sample: usize) -> UserContext {
    UserContext {
        user_id: session.user_id(),
        profile: session.profile().clone(),
        preferences: session.preferences().clone(),
        seen: session.seen_ids(),
        recent_likes: session.history().recent_likes(liked_sample),
        total_swipes: session.stats().total_swipes,
    }
}
