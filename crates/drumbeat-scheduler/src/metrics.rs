//! Engagement metrics baseline recording.
//!
//! Each successful publish appends one zeroed row to a CSV file so that
//! later engagement tracking starts from a known baseline. The file is
//! created with headers on first write and only ever appended to.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::SchedulerError;

const HEADERS: [&str; 9] = [
    "Date",
    "Platform",
    "Post_Number",
    "Topic",
    "Views",
    "Likes",
    "Comments",
    "Shares",
    "Engagement_Rate",
];

#[derive(Debug, Serialize)]
struct BaselineRow<'a> {
    date: String,
    platform: &'a str,
    post_number: &'a str,
    topic: &'a str,
    views: u64,
    likes: u64,
    comments: u64,
    shares: u64,
    engagement_rate: &'static str,
}

/// Appends zeroed engagement rows to a CSV file.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    path: PathBuf,
}

impl MetricsRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a zeroed baseline row for a just-published post.
    ///
    /// Creates the file (and headers) if it does not exist yet. Errors
    /// here must not fail the publish; the dispatcher logs and moves on.
    pub fn record_baseline(
        &self,
        post_id: &str,
        platform: &str,
        topic: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), SchedulerError> {
        let write_headers = !self.path.exists();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SchedulerError::Metrics(e.to_string()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SchedulerError::Metrics(e.to_string()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_headers {
            writer
                .write_record(HEADERS)
                .map_err(|e| SchedulerError::Metrics(e.to_string()))?;
        }
        writer
            .serialize(BaselineRow {
                date: recorded_at.format("%Y-%m-%d").to_string(),
                platform,
                post_number: post_id,
                topic: topic.unwrap_or(""),
                views: 0,
                likes: 0,
                comments: 0,
                shares: 0,
                engagement_rate: "0.00%",
            })
            .map_err(|e| SchedulerError::Metrics(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| SchedulerError::Metrics(e.to_string()))?;

        Ok(())
    }
}
