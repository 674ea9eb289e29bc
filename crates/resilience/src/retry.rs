//! Retry policy and jittered exponential backoff.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry policy for one remote dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
    /// Randomization applied to each delay (0.2 = +/-20%).
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

/// Issues the delays between retry attempts for one logical call.
///
/// A policy with `max_attempts` total attempts yields `max_attempts - 1`
/// delays; [`ExponentialBackoff::next_delay`] returns `None` once the
/// attempt budget is spent.
#[derive(Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    issued: u32,
}

impl ExponentialBackoff {
    /// Creates a backoff sequence for a fresh logical call.
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            policy: policy.clone(),
            issued: 0,
        }
    }

    /// Returns the delay to sleep before the next attempt, or `None` when
    /// no attempts remain.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.issued + 1 >= self.policy.max_attempts {
            return None;
        }

        let exponent = self.policy.multiplier.powi(self.issued as i32);
        let base_ms = (self.policy.initial_backoff.as_millis() as f64 * exponent)
            .min(self.policy.max_backoff.as_millis() as f64);
        let jittered_ms = self.apply_jitter(base_ms);

        self.issued += 1;
        Some(Duration::from_millis(jittered_ms as u64))
    }

    fn apply_jitter(&self, base_ms: f64) -> f64 {
        if self.policy.jitter <= 0.0 {
            return base_ms;
        }
        let spread = base_ms * self.policy.jitter;
        let low = (base_ms - spread).max(0.0);
        let high = base_ms + spread;
        rand::rng().random_range(low..=high)
    }
}
