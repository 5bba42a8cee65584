//! Error types for the store module.

use thiserror::Error;

use arca_core::ArchiveId;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error (tag column encoding).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An insert collided with an already-stored id.
    ///
    /// The registry allocates ids from the monotonic counter, so this only
    /// fires on misuse of the store API.
    #[error("archive {0} already stored")]
    DuplicateId(ArchiveId),

    /// A replace or grant targeted an archive the store does not hold.
    #[error("archive {0} not in store")]
    UnknownArchive(ArchiveId),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
