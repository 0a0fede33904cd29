//! Errors raised by the external collaborators behind the source traits.

use thiserror::Error;

/// A catalog or peer-store call that didn't produce data.
///
/// Callers treat both variants as transient: the ranking pass degrades
/// instead of failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Peer store unavailable: {0}")]
    PeerStoreUnavailable(String),
}
