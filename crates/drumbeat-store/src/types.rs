//! Scheduled post types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default retry budget for a post.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A post waiting to be published to an external platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    /// Opaque unique identifier, assigned at enqueue time.
    pub id: String,
    /// Destination platform tag ("linkedin", "twitter", ...).
    pub platform: String,
    /// Opaque payload; the scheduler never interprets it.
    pub content: String,
    /// Profile/destination identifier for the publish capability.
    pub target_ref: String,
    /// When this post becomes eligible for dispatch; only ever moves forward.
    pub scheduled_time: DateTime<Utc>,
    /// Current status of the post.
    pub status: PostStatus,
    /// Publish attempts that have failed so far.
    pub retry_count: u32,
    /// Attempts after which the post is marked failed.
    pub max_retries: u32,
    /// Reminder window keys already emitted for this post.
    #[serde(default)]
    pub reminders_sent: Vec<String>,
    /// Free-form context (topic, batch id) carried into history and metrics.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// When this post was enqueued.
    pub created_at: DateTime<Utc>,
}

/// Current status of a post.
///
/// "Due" is an eligibility check (`is_due`), not a persisted state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Waiting for its scheduled time (or for a retry window).
    #[default]
    Pending,
    /// Published successfully (terminal).
    Posted,
    /// Retries exhausted (terminal).
    Failed,
}

impl PostStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Posted | PostStatus::Failed)
    }
}

/// Input for enqueueing a new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub platform: String,
    pub content: String,
    pub target_ref: String,
    pub scheduled_time: DateTime<Utc>,
    /// Defaults to [`DEFAULT_MAX_RETRIES`] when absent.
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Immutable audit entry written when a post reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRecord {
    pub post_id: String,
    pub platform: String,
    /// Terminal status at the time of recording.
    pub status: PostStatus,
    pub retry_count: u32,
    /// Topic pulled from post metadata, when present.
    pub topic: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ScheduledPost {
    /// Build a post from validated enqueue input.
    pub(crate) fn from_new(id: String, new: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            platform: new.platform,
            content: new.content,
            target_ref: new.target_ref,
            scheduled_time: new.scheduled_time,
            status: PostStatus::Pending,
            retry_count: 0,
            max_retries: new.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            reminders_sent: Vec::new(),
            metadata: new.metadata,
            created_at: now,
        }
    }

    /// Check whether this post is eligible for dispatch at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Pending && self.scheduled_time <= now
    }

    /// Whether this post has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Topic string from metadata, when one was provided.
    pub fn topic(&self) -> Option<&str> {
        self.metadata.get("topic").and_then(|v| v.as_str())
    }
}

impl PublishRecord {
    /// Build the terminal audit record for a post.
    pub fn terminal(post: &ScheduledPost, recorded_at: DateTime<Utc>) -> Self {
        Self {
            post_id: post.id.clone(),
            platform: post.platform.clone(),
            status: post.status,
            retry_count: post.retry_count,
            topic: post.topic().map(str::to_string),
            recorded_at,
        }
    }
}
