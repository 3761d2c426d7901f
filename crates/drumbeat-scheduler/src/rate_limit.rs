//! Per-platform publish rate limiting.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Rate-limit configuration for one platform.
///
/// `cooldown` is the minimum spacing enforced between successful
/// publishes; `max_per_hour` is advisory and derivable from it.
#[derive(Debug, Clone, Copy)]
pub struct PlatformLimit {
    pub max_per_hour: u32,
    pub cooldown: Duration,
}

/// Tracks the minimum spacing between successful publishes per platform.
///
/// A denied check is not a failure: the post is simply tried again next
/// tick, without consuming a retry. The last-success timestamps
/// themselves live in the store, mutated only by the dispatcher.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limits: HashMap<String, PlatformLimit>,
    /// Cooldown applied to platforms without an explicit entry.
    default_cooldown: Duration,
}

impl Default for RateLimiter {
    /// Production defaults: linkedin 10/hr with a 6 minute cooldown,
    /// twitter 30/hr with a 2 minute cooldown. Unknown platforms are
    /// not throttled.
    fn default() -> Self {
        let mut limits = HashMap::new();
        limits.insert(
            "linkedin".to_string(),
            PlatformLimit {
                max_per_hour: 10,
                cooldown: Duration::minutes(6),
            },
        );
        limits.insert(
            "twitter".to_string(),
            PlatformLimit {
                max_per_hour: 30,
                cooldown: Duration::minutes(2),
            },
        );
        Self {
            limits,
            default_cooldown: Duration::zero(),
        }
    }
}

impl RateLimiter {
    /// A limiter with no per-platform entries and the given default cooldown.
    pub fn uniform(default_cooldown: Duration) -> Self {
        Self {
            limits: HashMap::new(),
            default_cooldown,
        }
    }

    /// Set or replace the limit for one platform.
    pub fn with_limit(mut self, platform: impl Into<String>, limit: PlatformLimit) -> Self {
        self.limits.insert(platform.into(), limit);
        self
    }

    /// The cooldown enforced for `platform`.
    pub fn cooldown(&self, platform: &str) -> Duration {
        self.limits
            .get(platform)
            .map(|l| l.cooldown)
            .unwrap_or(self.default_cooldown)
    }

    /// Whether a publish on `platform` is allowed at `now`, given the last
    /// confirmed success. Never errors and never blocks.
    pub fn allowed(
        &self,
        platform: &str,
        last_success: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        match last_success {
            Some(last) => now - last >= self.cooldown(platform),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_first_publish_always_allowed() {
        let limiter = RateLimiter::default();
        assert!(limiter.allowed("linkedin", None, Utc::now()));
        assert!(limiter.allowed("unknown", None, Utc::now()));
    }

    #[test_case("linkedin", 5, false ; "linkedin inside cooldown")]
    #[test_case("linkedin", 6, true ; "linkedin at cooldown boundary")]
    #[test_case("linkedin", 7, true ; "linkedin past cooldown")]
    #[test_case("twitter", 1, false ; "twitter inside cooldown")]
    #[test_case("twitter", 2, true ; "twitter at cooldown boundary")]
    fn test_cooldown_enforcement(platform: &str, elapsed_mins: i64, expected: bool) {
        let limiter = RateLimiter::default();
        let now = Utc::now();
        let last = now - Duration::minutes(elapsed_mins);
        assert_eq!(limiter.allowed(platform, Some(last), now), expected);
    }

    #[test]
    fn test_unknown_platform_uses_default_cooldown() {
        let now = Utc::now();

        // Default limiter: unknown platforms unthrottled
        let limiter = RateLimiter::default();
        assert!(limiter.allowed("mastodon", Some(now), now));

        // Uniform limiter throttles everything
        let strict = RateLimiter::uniform(Duration::minutes(10));
        assert!(!strict.allowed("mastodon", Some(now - Duration::minutes(9)), now));
        assert!(strict.allowed("mastodon", Some(now - Duration::minutes(10)), now));
    }

    #[test]
    fn test_with_limit_overrides() {
        let limiter = RateLimiter::default().with_limit(
            "linkedin",
            PlatformLimit {
                max_per_hour: 60,
                cooldown: Duration::minutes(1),
            },
        );
        assert_eq!(limiter.cooldown("linkedin"), Duration::minutes(1));
    }
}
