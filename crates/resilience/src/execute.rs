//! The composable resilient-call wrapper.

use std::future::Future;
use std::time::Duration;

use crate::breaker::CircuitBreaker;
use crate::error::{CallFailure, ResilienceError};
use crate::retry::{ExponentialBackoff, RetryPolicy};

/// Runs one logical remote call under the full resilience stack.
///
/// Each attempt is bounded by `call_timeout` (the in-flight future is
/// cancelled on expiry) and recorded on the shared breaker. Retryable
/// failures are retried sequentially with jittered backoff until the policy
/// is exhausted; a non-retryable failure aborts at once. When the breaker
/// refuses the call, nothing touches the network.
///
/// `attempt` is invoked once per attempt and must produce a fresh future
/// each time, so per-attempt work such as instance selection happens inside
/// the factory.
pub async fn execute<T, F, Fut>(
    breaker: &CircuitBreaker,
    policy: &RetryPolicy,
    call_timeout: Duration,
    mut attempt: F,
) -> Result<T, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CallFailure>>,
{
    let mut backoff = ExponentialBackoff::new(policy);
    let mut attempts = 0u32;

    loop {
        if !breaker.try_acquire() {
            metrics::counter!(
                "resilient_calls_short_circuited_total",
                "dependency" => breaker.name().to_string()
            )
            .increment(1);
            return Err(ResilienceError::CircuitOpen(breaker.name().to_string()));
        }

        attempts += 1;
        let failure = match tokio::time::timeout(call_timeout, attempt()).await {
            Ok(Ok(value)) => {
                breaker.record_success();
                return Ok(value);
            }
            Ok(Err(failure)) => failure,
            Err(_) => CallFailure::Timeout(call_timeout),
        };

        breaker.record_failure();
        tracing::debug!(
            dependency = breaker.name(),
            attempt = attempts,
            error = %failure,
            "remote call attempt failed"
        );

        if !failure.is_retryable() {
            return Err(ResilienceError::NonRetryable(failure));
        }

        match backoff.next_delay() {
            Some(delay) => tokio::time::sleep(delay).await,
            None => {
                return Err(ResilienceError::RetriesExhausted {
                    attempts,
                    last: failure,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircuitBreakerConfig;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            "inventory-service",
            CircuitBreakerConfig {
                wait_duration_in_open: Duration::from_secs(60),
                ..Default::default()
            },
        )
    }

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            jitter: 0.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn returns_value_on_first_success() {
        let breaker = breaker();
        let result = execute(&breaker, &quick_policy(3), Duration::from_secs(1), || async {
            Ok::<_, CallFailure>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(breaker.failure_rate(), 0.0);
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let breaker = breaker();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_in = calls.clone();
        let result = execute(
            &breaker,
            &quick_policy(3),
            Duration::from_secs(1),
            move || {
                let calls = calls_in.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(CallFailure::Connection("connection reset".into()))
                    } else {
                        Ok("stock")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "stock");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_on_persistent_failure() {
        let breaker = breaker();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_in = calls.clone();
        let result: Result<(), _> = execute(
            &breaker,
            &quick_policy(3),
            Duration::from_secs(1),
            move || {
                calls_in.fetch_add(1, Ordering::SeqCst);
                async { Err(CallFailure::Status(503)) }
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ResilienceError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_failure_aborts_immediately() {
        let breaker = breaker();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_in = calls.clone();
        let result: Result<(), _> = execute(
            &breaker,
            &quick_policy(5),
            Duration::from_secs(1),
            move || {
                calls_in.fetch_add(1, Ordering::SeqCst);
                async { Err(CallFailure::Malformed("expected JSON array".into())) }
            },
        )
        .await;

        assert!(matches!(result, Err(ResilienceError::NonRetryable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempts_are_cancelled_and_counted_as_failures() {
        let breaker = breaker();

        let result: Result<(), _> = execute(
            &breaker,
            &quick_policy(2),
            Duration::from_millis(10),
            || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ResilienceError::RetriesExhausted {
                attempts: 2,
                last: CallFailure::Timeout(_),
            })
        ));
        assert!(breaker.failure_rate() > 0.0);
    }

    #[tokio::test]
    async fn open_breaker_short_circuits_without_calling() {
        let breaker = breaker();
        // Drive the breaker open through recorded failures
        for _ in 0..10 {
            breaker.record_failure();
        }

        let calls = Arc::new(AtomicU32::new(0));
        let calls_in = calls.clone();
        let started = std::time::Instant::now();
        let result: Result<(), _> = execute(
            &breaker,
            &quick_policy(3),
            Duration::from_secs(5),
            move || {
                calls_in.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
        )
        .await;

        assert!(matches!(result, Err(ResilienceError::CircuitOpen(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // Fallback path must answer in a fraction of the call timeout
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
