//! Retry policy for transient query failures.

use std::time::Duration;

use rand::Rng;

/// Capped exponential backoff with jitter.
///
/// The delay for attempt `n` (1-based) is `base_delay * 2^(n-1)`, capped at
/// `max_delay`, plus a uniform random jitter of up to `max_jitter` so that
/// parallel invocations of the tool do not retry in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the initial one.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Ceiling applied to the exponential delay before jitter.
    pub max_delay: Duration,
    /// Maximum jitter added to each delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is permitted after `attempts` have been made.
    #[must_use]
    pub const fn allows_another_attempt(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Backoff delay to sleep after the given (1-based) failed attempt.
    #[must_use]
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let exponent = 2_u64.saturating_pow(attempt.saturating_sub(1));
        let mut delay_ms = base_ms.saturating_mul(exponent);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        if delay_ms > max_ms {
            delay_ms = max_ms;
        }
        let jitter_ms = if self.max_jitter.is_zero() {
            0
        } else {
            let jitter_max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
            rand::thread_rng().gen_range(0..=jitter_max)
        };
        Duration::from_millis(delay_ms.saturating_add(jitter_ms))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::RetryPolicy;

    fn jitterless(base_ms: u64, max_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
            max_jitter: Duration::ZERO,
        }
    }

    #[rstest]
    #[case(1, 1000)]
    #[case(2, 2000)]
    #[case(3, 4000)]
    #[case(4, 8000)]
    #[case(5, 16_000)]
    fn delay_doubles_per_attempt(#[case] attempt: u32, #[case] expected_ms: u64) {
        let policy = jitterless(1000, 60_000);
        assert_eq!(
            policy.delay_after_attempt(attempt),
            Duration::from_millis(expected_ms)
        );
    }

    #[test]
    fn delay_is_capped_at_max() {
        let policy = jitterless(1000, 5000);
        assert_eq!(policy.delay_after_attempt(10), Duration::from_millis(5000));
    }

    #[test]
    fn jitter_stays_within_bound() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(100),
            max_jitter: Duration::from_millis(50),
        };
        for _ in 0..32 {
            let delay = policy.delay_after_attempt(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn attempt_budget_counts_the_first_attempt() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_another_attempt(4));
        assert!(!policy.allows_another_attempt(5));
    }
}
