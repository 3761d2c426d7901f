//! Upcoming-post reminders.
//!
//! Shortly before a post's scheduled time, the loop emits a reminder log
//! line and marks the post so the same window never fires twice, even
//! across restarts.

use chrono::{DateTime, Duration, Utc};
use drumbeat_store::PostStore;
use tracing::info;

use crate::SchedulerError;

/// The key recorded in a post's `reminders_sent` for a given window,
/// e.g. `"15m"` for a fifteen minute lead.
pub fn window_key(window: Duration) -> String {
    format!("{}m", window.num_minutes())
}

/// Emit reminders for pending posts entering the reminder window.
///
/// A post qualifies when it is not yet due, its scheduled time is within
/// `window` of `now`, and this window's key has not been recorded on it.
/// Returns the number of reminders emitted.
pub async fn emit_reminders(
    store: &PostStore,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<usize, SchedulerError> {
    let key = window_key(window);
    let mut emitted = 0;

    for mut post in store.active().await {
        // Already-due posts go straight to dispatch, no reminder
        let lead = post.scheduled_time - now;
        if lead < Duration::zero() || lead > window || post.reminders_sent.contains(&key) {
            continue;
        }
        info!(
            id = %post.id,
            platform = %post.platform,
            scheduled_time = %post.scheduled_time,
            minutes_until = lead.num_minutes(),
            "upcoming post reminder"
        );
        post.reminders_sent.push(key.clone());
        store.update(post).await?;
        emitted += 1;
    }

    Ok(emitted)
}
