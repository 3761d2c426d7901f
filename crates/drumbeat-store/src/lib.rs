//! Durable scheduled-post store for Drumbeat.
//!
//! This crate provides the single source of truth for scheduler state:
//! - Active post records with their retry bookkeeping
//! - Append-only publish history
//! - Per-platform last-success timestamps for rate limiting
//! - Atomic JSON snapshot/reload for crash recovery

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::{PostStore, StatusCounts};
pub use types::{DEFAULT_MAX_RETRIES, NewPost, PostStatus, PublishRecord, ScheduledPost};
