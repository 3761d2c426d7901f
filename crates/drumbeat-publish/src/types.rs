//! Publish request/response types and the dispatcher-facing seam.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Type alias for the publish function the dispatcher invokes.
///
/// The scheduler observes only success or error; everything else
/// (auth, internal retries, partial delivery) belongs to the
/// implementation behind this seam.
pub type Publisher = Arc<
    dyn Fn(PublishRequest) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>>
        + Send
        + Sync,
>;

/// One publish attempt, as seen by the publish capability.
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    pub post_id: String,
    pub platform: String,
    pub target_ref: String,
    pub content: String,
}

/// Receipt returned by the publishing endpoint on success.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishReceipt {
    /// Remote identifier for the queued update, when the API returns one.
    pub id: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// A connected destination profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub service: String,
    #[serde(default)]
    pub service_display_name: Option<String>,
}
