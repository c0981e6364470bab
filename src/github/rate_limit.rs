//! Rate limit state reported in GraphQL response bodies.
//!
//! GitHub's GraphQL API reports cost-based quota through the `rateLimit`
//! object inside the response payload rather than through HTTP headers. The
//! client reads that object on every response and pauses proactively when
//! the remaining budget drops to the configured floor.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Quota state decoded from one response's `rateLimit` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    limit: u32,
    cost: u32,
    remaining: u32,
    reset_at: DateTime<Utc>,
}

impl RateLimitStatus {
    /// Creates a new rate limit status.
    #[must_use]
    pub const fn new(limit: u32, cost: u32, remaining: u32, reset_at: DateTime<Utc>) -> Self {
        Self {
            limit,
            cost,
            remaining,
            reset_at,
        }
    }

    /// Maximum points available in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Points the producing query cost.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Points remaining in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// When the current window resets.
    #[must_use]
    pub const fn reset_at(&self) -> DateTime<Utc> {
        self.reset_at
    }

    /// Whether the remaining budget has dropped to the throttle floor.
    #[must_use]
    pub const fn is_at_floor(&self, floor: u32) -> bool {
        self.remaining <= floor
    }

    /// How long to pause, from `now`, before the next request may be issued.
    ///
    /// Returns zero when the reset instant (plus `buffer`) has already
    /// passed.
    #[must_use]
    pub fn pause_duration(&self, now: DateTime<Utc>, buffer: Duration) -> Duration {
        let resume_at = self.reset_at + buffer;
        (resume_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Proactive throttling configuration for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Remaining-budget floor at or below which the client pauses.
    pub remaining_floor: u32,
    /// Safety margin added past the reported reset instant.
    pub resume_buffer: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            remaining_floor: 100,
            resume_buffer: Duration::from_secs(5),
        }
    }
}
