//! Storage trait definitions

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key/value blob store with plain get/set semantics
///
/// Implementations must be thread-safe (Send + Sync) so a shared engine
/// can persist from any task.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under a key, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a blob under a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: BlobStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
