//! Retry policy.
//!
//! Fixed-schedule backoff used for delivery attempts against external
//! providers. Transient faults (gateway timeouts, provider 5xx) are worth a
//! bounded number of retries; business rejections are not — the caller
//! decides which is which.

use std::time::Duration;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Retry policy with an explicit backoff schedule.
///
/// Unlike exponential backoff, the schedule is a fixed list of delays so the
/// worst-case latency of a send operation is known in advance. Attempts
/// beyond the schedule length reuse the last delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per operation (first try included)
    pub max_attempts: u32,
    /// Delay before the 2nd, 3rd, ... attempt
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    /// Default schedule: 3 attempts, waiting 1s then 5s then 15s.
    ///
    /// Tuned for SMS gateways, where a second retry often lands after a
    /// transient congestion window has passed.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(5),
                Duration::from_secs(15),
            ],
        }
    }
}

impl RetryPolicy {
    /// Build a policy from configuration values (delays in seconds)
    pub fn from_seconds(max_attempts: u32, delays_seconds: &[u64]) -> Self {
        Self {
            max_attempts,
            delays: delays_seconds
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        }
    }

    /// Delay to wait after the Nth failed attempt (attempt counted from 1).
    ///
    /// Clamps to the last scheduled delay when the schedule is shorter than
    /// the attempt count; zero when no delays are configured.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        if self.delays.is_empty() {
            return Duration::ZERO;
        }
        let idx = (attempt.max(1) as usize - 1).min(self.delays.len() - 1);
        self.delays[idx]
    }

    /// Whether another attempt is allowed after `attempts_made` tries
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}
