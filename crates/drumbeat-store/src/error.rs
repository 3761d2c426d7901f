//! Error types for the post store.

use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Enqueue input failed validation and never entered the store.
    #[error("invalid post: {0}")]
    Validation(String),

    /// Post not found.
    #[error("post not found: {0}")]
    PostNotFound(String),

    /// Snapshot file IO failed.
    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failed.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
