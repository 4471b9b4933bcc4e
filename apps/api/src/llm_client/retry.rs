use std::time::Duration;

use reqwest::StatusCode;

/// Backoff schedule for transient Gemini failures.
///
/// Only "rate limited" (429) and "service overloaded" (503) are treated as transient.
/// Every other failure is surfaced to the caller on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based): base, 2×base, 4×base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn is_transient(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_is_one_two_four_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_only_429_and_503_are_transient() {
        assert!(RetryPolicy::is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(RetryPolicy::is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!RetryPolicy::is_transient(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!RetryPolicy::is_transient(StatusCode::BAD_GATEWAY));
        assert!(!RetryPolicy::is_transient(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_large_retry_index_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for(200) >= policy.delay_for(3));
    }
}
