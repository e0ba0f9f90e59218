// Retry logic for transient store contention

use crate::error::AppError;
use std::time::Duration;

/// Retry policy for transient store conflicts
///
/// The SQLite adapter reports lock contention and stale-snapshot write
/// upgrades as `AppError::Busy`. Those attempts are safe to repeat: every use
/// case re-reads its entities at the start of each attempt, so a retry
/// observes whatever state the competing writer committed. Anything still
/// `Busy` after the attempt budget surfaces as `Conflict`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 25,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first (minimum 1)
    /// * `base_delay_ms` - Backoff base delay in milliseconds
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    /// True when `err` is transient and the attempt budget is not spent
    ///
    /// `attempt` is zero-based: with `max_attempts = 3`, attempts 0 and 1 may
    /// be retried and attempt 2 is the last one.
    pub fn should_retry(&self, err: &AppError, attempt: u32) -> bool {
        matches!(err, AppError::Busy(_)) && attempt + 1 < self.max_attempts
    }

    /// Backoff delay for the given attempt
    ///
    /// Exponential (doubling per attempt) with deterministic ±10% jitter
    /// seeded from the entity key, so competing callers spread out without
    /// pulling in a randomness source.
    pub fn backoff_delay(&self, seed: &str, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64 * 2f64.powi(attempt as i32);

        let jitter_seed = seed.chars().map(|c| c as u32).sum::<u32>();
        let jitter_factor = 0.9 + ((jitter_seed.wrapping_add(attempt) % 21) as f64 / 100.0); // 0.9 to 1.1

        Duration::from_millis((base * jitter_factor) as u64)
    }

    /// Map an exhausted transient error onto the caller-facing taxonomy
    pub fn surface(err: AppError) -> AppError {
        match err {
            AppError::Busy(msg) => AppError::Conflict(msg),
            other => other,
        }
    }
}
