//! Dispatch loop, rate limiting, and retry policy for Drumbeat.
//!
//! This crate owns the scheduler's behavior:
//! - A periodic loop that reminds, dispatches, and snapshots each tick
//! - Per-platform cooldown enforcement between successful publishes
//! - Bounded retries with a fixed reschedule delay
//! - A zeroed metrics baseline row written on every successful publish
//!
//! All post mutation happens on the single loop task; external callers
//! interact through [`Scheduler`]'s control surface.

mod config;
mod dispatcher;
mod error;
mod metrics;
mod rate_limit;
mod reminder;
mod scheduler;

pub use config::SchedulerConfig;
pub use dispatcher::TickReport;
pub use error::SchedulerError;
pub use metrics::MetricsRecorder;
pub use rate_limit::{PlatformLimit, RateLimiter};
pub use reminder::window_key;
pub use scheduler::{NextDue, Scheduler, SchedulerStatus};
