//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Token or card file could not be read or written.
    #[error("File error at {}: {source}", path.display())]
    File {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Embedded database error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A credential write failed after earlier writes were persisted.
    #[error("Failed to write {key} after {written} successful writes: {source}")]
    PartialCommit {
        /// Key that failed.
        key: String,
        /// Number of keys written before the failure.
        written: usize,
        /// Underlying database error.
        #[source]
        source: rusqlite::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A default path could not be determined (no home directory).
    #[error("Could not determine {0} path")]
    NoPath(&'static str),
}

impl StoreError {
    /// Returns true if the database was locked by another process.
    pub fn is_busy(&self) -> bool {
        let sqlite = match self {
            StoreError::Sqlite(e) | StoreError::PartialCommit { source: e, .. } => e,
            _ => return false,
        };
        matches!(
            sqlite.sqlite_error_code(),
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        )
    }
}
