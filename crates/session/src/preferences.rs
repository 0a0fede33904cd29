//! Declared preferences collected by onboarding.

use data_loader::{ContentType, YearRange};
use serde::{Deserialize, Serialize};

/// What the user told us up front. Steers catalog queries; it never
/// changes the taste profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub content_type: ContentType,
    /// Language codes; empty means any language
    pub languages: Vec<String>,
    /// Genre names; empty means any genre
    pub genres: Vec<String>,
    pub year_range: Option<YearRange>,
}
