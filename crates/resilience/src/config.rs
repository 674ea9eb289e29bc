//! Per-dependency resilience configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Circuit breaker tuning for one remote dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failure ratio over the sliding window that opens the circuit (0.0-1.0).
    pub failure_rate_threshold: f64,
    /// Number of recent call outcomes considered for the failure ratio.
    pub sliding_window_size: usize,
    /// Outcomes required in the window before the ratio is evaluated.
    pub minimum_calls: usize,
    /// Time spent OPEN before trial calls are permitted.
    pub wait_duration_in_open: Duration,
    /// Trial calls permitted in HALF_OPEN; the same count of consecutive
    /// successes closes the circuit again.
    pub permitted_calls_in_half_open: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            sliding_window_size: 10,
            minimum_calls: 4,
            wait_duration_in_open: Duration::from_secs(5),
            permitted_calls_in_half_open: 3,
        }
    }
}

/// Complete resilience settings for one remote dependency: breaker, retry,
/// and the per-attempt timeout budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Circuit breaker tuning.
    pub breaker: CircuitBreakerConfig,
    /// Retry policy.
    pub retry: RetryPolicy,
    /// Upper bound for a single call attempt.
    pub call_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            breaker: CircuitBreakerConfig::default(),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(2),
        }
    }
}

impl ResilienceConfig {
    /// Returns the default configuration with a specific call timeout.
    pub fn with_call_timeout(call_timeout: Duration) -> Self {
        Self {
            call_timeout,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_breaker_values() {
        let config = CircuitBreakerConfig::default();
        assert!((config.failure_rate_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.sliding_window_size, 10);
        assert_eq!(config.minimum_calls, 4);
        assert_eq!(config.permitted_calls_in_half_open, 3);
    }

    #[test]
    fn with_call_timeout_overrides_only_the_timeout() {
        let config = ResilienceConfig::with_call_timeout(Duration::from_millis(750));
        assert_eq!(config.call_timeout, Duration::from_millis(750));
        assert_eq!(config.retry.max_attempts, RetryPolicy::default().max_attempts);
    }
}
