//! The scheduled-post store and its snapshot persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{NewPost, PostStatus, PublishRecord, ScheduledPost, StoreError};

/// Counts of posts by state, for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// All non-terminal posts.
    pub pending: usize,
    /// Subset of pending posts whose scheduled time has arrived.
    pub due: usize,
    pub posted: usize,
    pub failed: usize,
}

/// Everything the scheduler persists, in one snapshot document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreInner {
    posts: HashMap<String, ScheduledPost>,
    history: Vec<PublishRecord>,
    last_success: HashMap<String, DateTime<Utc>>,
}

/// The single source of truth for scheduler state.
///
/// All mutation goes through this store; the scheduler loop is the only
/// writer of post status, while producers may enqueue concurrently. One
/// RwLock guards the in-memory state, and `snapshot` atomically replaces
/// the on-disk copy so a crash loses at most the current tick's progress.
pub struct PostStore {
    inner: RwLock<StoreInner>,
    /// Serializes snapshot writes; the loop, enqueue, and web callers may
    /// all snapshot concurrently, but only one may touch the temp file.
    snapshot_lock: Mutex<()>,
    path: PathBuf,
    /// How far in the past a new post's scheduled time may lie.
    grace: Duration,
}

impl PostStore {
    /// Open the store at `path`, rehydrating a snapshot if one exists.
    pub fn open(path: impl Into<PathBuf>, grace: Duration) -> Result<Self, StoreError> {
        let path = path.into();

        let inner = if path.exists() {
            let raw = std::fs::read(&path)?;
            let inner: StoreInner = serde_json::from_slice(&raw)?;
            info!(
                path = %path.display(),
                posts = inner.posts.len(),
                history = inner.history.len(),
                "loaded scheduler snapshot"
            );
            inner
        } else {
            info!(path = %path.display(), "no snapshot found, starting fresh");
            StoreInner::default()
        };

        Ok(Self {
            inner: RwLock::new(inner),
            snapshot_lock: Mutex::new(()),
            path,
            grace,
        })
    }

    /// Validate and insert a new post, returning its assigned id.
    ///
    /// Invalid input is rejected here and never enters the store.
    pub async fn enqueue(&self, new: NewPost) -> Result<String, StoreError> {
        let now = Utc::now();
        validate(&new, now, self.grace)?;

        let id = Uuid::new_v4().to_string();
        let post = ScheduledPost::from_new(id.clone(), new, now);

        debug!(
            id = %post.id,
            platform = %post.platform,
            scheduled_time = %post.scheduled_time,
            "enqueued post"
        );

        self.inner.write().await.posts.insert(id.clone(), post);
        Ok(id)
    }

    /// Get a post by id, terminal or not.
    pub async fn get(&self, id: &str) -> Option<ScheduledPost> {
        self.inner.read().await.posts.get(id).cloned()
    }

    /// All non-terminal posts.
    pub async fn active(&self) -> Vec<ScheduledPost> {
        self.inner
            .read()
            .await
            .posts
            .values()
            .filter(|p| !p.is_terminal())
            .cloned()
            .collect()
    }

    /// Replace a post by id.
    pub async fn update(&self, post: ScheduledPost) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&post.id) {
            return Err(StoreError::PostNotFound(post.id));
        }
        inner.posts.insert(post.id.clone(), post);
        Ok(())
    }

    /// Append an immutable history record.
    pub async fn append_history(&self, record: PublishRecord) {
        self.inner.write().await.history.push(record);
    }

    /// The full publish history, oldest first.
    pub async fn history(&self) -> Vec<PublishRecord> {
        self.inner.read().await.history.clone()
    }

    /// When the last confirmed publish succeeded on `platform`.
    pub async fn last_success(&self, platform: &str) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_success.get(platform).copied()
    }

    /// Record a confirmed successful publish on `platform`.
    pub async fn record_success(&self, platform: &str, at: DateTime<Utc>) {
        self.inner
            .write()
            .await
            .last_success
            .insert(platform.to_string(), at);
    }

    /// Counts by state, with dueness evaluated at `now`.
    pub async fn counts(&self, now: DateTime<Utc>) -> StatusCounts {
        let inner = self.inner.read().await;
        let mut counts = StatusCounts::default();
        for post in inner.posts.values() {
            match post.status {
                PostStatus::Pending => {
                    counts.pending += 1;
                    if post.is_due(now) {
                        counts.due += 1;
                    }
                }
                PostStatus::Posted => counts.posted += 1,
                PostStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// The pending post with the earliest scheduled time, if any.
    pub async fn next_due(&self) -> Option<ScheduledPost> {
        self.inner
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.status == PostStatus::Pending)
            .min_by_key(|p| p.scheduled_time)
            .cloned()
    }

    /// Persist the full state, atomically replacing the previous snapshot.
    ///
    /// Writes a temp sibling and renames it over the snapshot path so a
    /// crash mid-write never corrupts the previous snapshot. Concurrent
    /// callers are serialized on `snapshot_lock` so their write/rename
    /// pairs never interleave on the shared temp file.
    pub async fn snapshot(&self) -> Result<(), StoreError> {
        let _guard = self.snapshot_lock.lock().await;

        let encoded = {
            let inner = self.inner.read().await;
            serde_json::to_vec_pretty(&*inner)?
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = tmp_path(&self.path);
        std::fs::write(&tmp, &encoded)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), bytes = encoded.len(), "wrote snapshot");
        Ok(())
    }

    /// The snapshot path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn validate(new: &NewPost, now: DateTime<Utc>, grace: Duration) -> Result<(), StoreError> {
    if new.platform.trim().is_empty() {
        return Err(StoreError::Validation("platform must not be empty".into()));
    }
    if new.content.trim().is_empty() {
        return Err(StoreError::Validation("content must not be empty".into()));
    }
    if new.target_ref.trim().is_empty() {
        return Err(StoreError::Validation("target_ref must not be empty".into()));
    }
    if new.max_retries == Some(0) {
        return Err(StoreError::Validation(
            "max_retries must be at least 1".into(),
        ));
    }
    if new.scheduled_time < now - grace {
        return Err(StoreError::Validation(format!(
            "scheduled_time {} is more than {} minutes in the past",
            new.scheduled_time,
            grace.num_minutes()
        )));
    }
    Ok(())
}
