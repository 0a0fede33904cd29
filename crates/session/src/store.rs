//! Persistence for the session aggregate.
//!
//! The whole aggregate is written as one JSON document, replaced in full on
//! every write. The document is versionless: missing fields fall back to
//! their defaults when read.

use crate::log::InteractionLog;
use crate::preferences::UserPreferences;
use crate::profile::TasteProfile;
use crate::stats::SessionStats;
use crate::watchlist::Watchlist;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors from reading or writing a persisted session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored blob exists but can't be read as a session
    #[error("Corrupt session data: {reason}")]
    Corrupt { reason: String },
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSession {
    pub profile: TasteProfile,
    pub history: InteractionLog,
    pub watchlist: Watchlist,
    pub stats: SessionStats,
    pub preferences: UserPreferences,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersistedSession {
    /// Parse a stored blob. Unknown fields are ignored, missing ones defaulted.
    pub fn from_json(blob: &str) -> Result<Self, SessionError> {
        serde_json::from_str(blob).map_err(|e| SessionError::Corrupt {
            reason: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A list element that is kept when it parses and dropped when it doesn't.
#[derive(Deserialize)]
#[serde(untagged)]
enum Entry<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// Read a JSON array, dropping elements that fail to parse as `T` instead
/// of rejecting the whole document.
pub(crate) fn valid_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Vec::<Entry<T>>::deserialize(deserializer)?;
    let total = entries.len();
    let valid: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Entry::Valid(value) => Some(value),
            Entry::Invalid(_) => None,
        })
        .collect();
    if valid.len() < total {
        warn!(skipped = total - valid.len(), "Dropped unreadable session entries");
    }
    Ok(valid)
}

/// Durable home of one user's session.
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PersistedSession>, SessionError>;

    /// Replace the stored session.
    fn save(&self, session: &PersistedSession) -> Result<(), SessionError>;

    /// Forget the stored session.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Session stored as a JSON file; writes go to a sibling temp file that is
/// then renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        let blob = match fs::read_to_string(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        PersistedSession::from_json(&blob).map(Some)
    }

    fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let blob = session.to_json()?;
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(blob.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the serialized blob in memory. Round-trips through JSON like the
/// file store so tests see the same (de)serialization behaviour.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a raw stored blob, which need not be valid.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        match self.blob.lock().as_deref() {
            Some(blob) => PersistedSession::from_json(blob).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        let blob = session.to_json()?;
        *self.blob.lock() = Some(blob);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.blob.lock() = None;
        Ok(())
    }
}
