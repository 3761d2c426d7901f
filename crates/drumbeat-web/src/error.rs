//! Error types for the web API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use drumbeat_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur in the web API.
#[derive(Debug, Error)]
pub enum WebError {
    /// Scheduler error.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] drumbeat_scheduler::SchedulerError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No post with the requested id.
    #[error("post not found: {0}")]
    NotFound(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Scheduler(drumbeat_scheduler::SchedulerError::Store(e)) => match e {
                StoreError::Validation(_) => StatusCode::BAD_REQUEST,
                StoreError::PostNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
