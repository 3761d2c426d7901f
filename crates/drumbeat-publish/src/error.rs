//! Error types for the publish client.

use thiserror::Error;

/// Errors that can occur when talking to the publishing endpoint.
#[derive(Debug, Error)]
pub enum PublishError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the publishing endpoint.
    #[error("rate limited{}", retry_after_secs.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited {
        /// Seconds to wait before retrying (from Retry-After header, optional).
        retry_after_secs: Option<u64>,
    },

    /// The endpoint returned an error status.
    #[error("publish API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered but the body made no sense.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
