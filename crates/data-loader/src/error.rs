//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading a catalog dataset from disk.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A data file wasn't valid JSON for the expected shape
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two catalog entries share the same id
    #[error("Duplicate content id {id}")]
    DuplicateId { id: u64 },

    /// Referenced entity doesn't exist (e.g., peer action on unknown content)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u64 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
