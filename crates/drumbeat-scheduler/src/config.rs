//! Scheduler configuration.

use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::RateLimiter;

/// Tunable knobs for the scheduler loop and dispatch policy.
///
/// The retry delay and reminder window are configuration, not contracts:
/// the defaults match the production values this scheduler replaces.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the loop ticks.
    pub tick_interval: StdDuration,
    /// Fixed reschedule delay after a failed publish attempt.
    pub retry_delay: Duration,
    /// How far ahead of the scheduled time reminders fire.
    pub reminder_window: Duration,
    /// Upper bound on a single publish call; a timeout counts as a failure.
    pub publish_timeout: StdDuration,
    /// How long the loop sleeps after a tick-level error before retrying.
    pub error_backoff: StdDuration,
    /// Per-platform publish spacing.
    pub rate_limits: RateLimiter,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: StdDuration::from_secs(60),
            retry_delay: Duration::hours(1),
            reminder_window: Duration::minutes(15),
            publish_timeout: StdDuration::from_secs(30),
            error_backoff: StdDuration::from_secs(30),
            rate_limits: RateLimiter::default(),
        }
    }
}
