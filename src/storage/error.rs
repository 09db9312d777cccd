//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by a storage backend. None of them are recovered inside
/// the engine; they propagate to whoever called it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Snapshot file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot or row could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Connection failure, constraint violation, or any other driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot entry whose key disagrees with the record it holds.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
