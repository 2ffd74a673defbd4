//! Retry policy for transient HTTP failures
//!
//! Transient status codes are the ones curl's `--retry` treats as such:
//! 408, 429, 500, 502, 503, 504. Waits grow exponentially: `base * 2^attempt`,
//! with `attempt` counted from 1, capped at `max_wait`.

use std::time::Duration;

/// Status codes worth retrying
pub const TRANSIENT_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// How many times, and how patiently, to retry a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base: Duration,
    max_wait: Duration,
}

impl Default for RetryPolicy {
    /// No retries; 1s base (first wait 2s), waits capped at 5 minutes.
    fn default() -> Self {
        Self {
            max_retries: 0,
            base: Duration::from_secs(1),
            max_wait: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base: Duration, max_wait: Duration) -> Self {
        Self {
            max_retries,
            base,
            max_wait,
        }
    }

    /// Default timing with `max_retries` attempts after the first.
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns true for status codes worth retrying.
    pub fn is_transient(status: u16) -> bool {
        TRANSIENT_STATUS_CODES.contains(&status)
    }

    /// Returns true if a response with `status` after `attempted` retries
    /// should be retried.
    pub fn should_retry(&self, status: u16, attempted: u32) -> bool {
        Self::is_transient(status) && attempted < self.max_retries
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .unwrap_or(self.max_wait)
            .min(self.max_wait)
    }
}
