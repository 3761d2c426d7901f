//! Per-tick dispatch of due posts.
//!
//! The dispatcher walks every due post in scheduled order and drives the
//! status transitions: a success terminates the post as posted, a failure
//! either reschedules it with a fixed delay or terminates it as failed
//! once its retry budget is spent, and a rate-limit denial defers it to a
//! later tick without touching the post at all.

use chrono::{DateTime, Utc};
use drumbeat_publish::{PublishRequest, Publisher};
use drumbeat_store::{PostStatus, PostStore, PublishRecord};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{MetricsRecorder, SchedulerConfig, SchedulerError};

/// What one tick did, for status reporting and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub published: usize,
    pub retried: usize,
    pub failed: usize,
    pub deferred: usize,
    pub reminded: usize,
}

/// Dispatch every post due at `now`, oldest scheduled time first.
///
/// Posts are attempted sequentially; a failure on one post never stops
/// the rest of the batch.
pub(crate) async fn dispatch_due(
    store: &PostStore,
    publisher: &Publisher,
    config: &SchedulerConfig,
    metrics: Option<&MetricsRecorder>,
    now: DateTime<Utc>,
    report: &mut TickReport,
) -> Result<(), SchedulerError> {
    let mut due: Vec<_> = store
        .active()
        .await
        .into_iter()
        .filter(|p| p.is_due(now))
        .collect();
    due.sort_by_key(|p| p.scheduled_time);

    for mut post in due {
        let last = store.last_success(&post.platform).await;
        if !config.rate_limits.allowed(&post.platform, last, now) {
            debug!(
                id = %post.id,
                platform = %post.platform,
                "rate limited, deferring to a later tick"
            );
            report.deferred += 1;
            continue;
        }

        let request = PublishRequest {
            post_id: post.id.clone(),
            platform: post.platform.clone(),
            target_ref: post.target_ref.clone(),
            content: post.content.clone(),
        };

        let outcome = match tokio::time::timeout(config.publish_timeout, publisher(request)).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "publish timed out after {}s",
                config.publish_timeout.as_secs()
            )),
        };

        match outcome {
            Ok(()) => {
                post.status = PostStatus::Posted;
                info!(
                    id = %post.id,
                    platform = %post.platform,
                    retry_count = post.retry_count,
                    "published post"
                );
                store.record_success(&post.platform, now).await;
                store.append_history(PublishRecord::terminal(&post, now)).await;
                if let Some(recorder) = metrics
                    && let Err(e) =
                        recorder.record_baseline(&post.id, &post.platform, post.topic(), now)
                {
                    error!(id = %post.id, error = %e, "failed to record metrics baseline");
                }
                store.update(post).await?;
                report.published += 1;
            }
            Err(reason) => {
                post.retry_count += 1;
                if post.retry_count >= post.max_retries {
                    post.status = PostStatus::Failed;
                    error!(
                        id = %post.id,
                        platform = %post.platform,
                        retry_count = post.retry_count,
                        error = %reason,
                        "retries exhausted, marking post failed"
                    );
                    store.append_history(PublishRecord::terminal(&post, now)).await;
                    store.update(post).await?;
                    report.failed += 1;
                } else {
                    post.scheduled_time = now + config.retry_delay;
                    warn!(
                        id = %post.id,
                        platform = %post.platform,
                        retry_count = post.retry_count,
                        next_attempt = %post.scheduled_time,
                        error = %reason,
                        "publish failed, rescheduling"
                    );
                    store.update(post).await?;
                    report.retried += 1;
                }
            }
        }
    }

    Ok(())
}
