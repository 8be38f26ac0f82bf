//! Retry policy and backoff schedule.

use crate::config::RetrySettings;
use std::time::Duration;

/// Resolved retry policy for one dispatcher.
///
/// Derived from [`RetrySettings`] once at construction; all durations are
/// concrete so the dispatch loop never touches raw config values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts per invocation. Always at least 1.
    pub max_attempts: u32,
    /// Base delay; doubled for each further attempt.
    pub backoff_base: Duration,
    /// Time budget for a single attempt.
    pub attempt_timeout: Duration,
    /// Budget for the whole invocation, attempts and sleeps included.
    pub overall_deadline: Duration,
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
            attempt_timeout: Duration::from_secs(settings.attempt_timeout_secs),
            overall_deadline: Duration::from_secs(settings.overall_deadline_secs),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after a failed attempt, before attempt `attempt + 1`.
    ///
    /// Exponential: `base * 2^(attempt - 1)`, so attempt 1 waits the base
    /// delay, attempt 2 twice that, and so on. Attempts are 1-based.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1 << exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::from(&RetrySettings::default())
    }

    #[test]
    fn delays_double_per_attempt() {
        let policy = policy();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1600));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(3200));
    }

    #[test]
    fn delays_are_strictly_increasing() {
        let policy = policy();
        let mut previous = Duration::ZERO;
        for attempt in 1..=8 {
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay > previous, "attempt {attempt} did not increase");
            previous = delay;
        }
    }

    #[test]
    fn large_attempt_numbers_do_not_overflow() {
        let policy = policy();
        let delay = policy.delay_for_attempt(u32::MAX);
        assert!(delay >= policy.delay_for_attempt(17));
    }

    #[test]
    fn zero_max_attempts_is_raised_to_one() {
        let settings = RetrySettings {
            max_attempts: 0,
            ..RetrySettings::default()
        };
        assert_eq!(RetryPolicy::from(&settings).max_attempts, 1);
    }
}
