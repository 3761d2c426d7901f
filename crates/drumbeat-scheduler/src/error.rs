//! Error types for the scheduler.

use thiserror::Error;

/// Errors that can occur in scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] drumbeat_store::StoreError),

    /// Metrics baseline write failed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// The loop is already running.
    #[error("scheduler is already running")]
    AlreadyRunning,
}
