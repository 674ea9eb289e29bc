//! Circuit breaker shared by every caller of one remote dependency.
//!
//! State machine:
//!
//! ```text
//! CLOSED    -> OPEN      failure ratio over the sliding window meets the
//!                        threshold (once the minimum-calls floor is reached)
//! OPEN      -> HALF_OPEN wait duration elapsed since opening
//! HALF_OPEN -> CLOSED    the permitted trial calls all succeeded
//! HALF_OPEN -> OPEN      any trial call failed (wait timer restarts)
//! ```
//!
//! While OPEN, [`CircuitBreaker::try_acquire`] refuses the call so it never
//! reaches the network; callers answer with their fallback instead.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::CircuitBreakerConfig;

/// Circuit breaker mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls flow normally; outcomes feed the sliding window.
    Closed,
    /// Calls are refused without touching the network.
    Open,
    /// A limited number of trial calls probe for recovery.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    window: VecDeque<Outcome>,
    opened_at: Option<Instant>,
    trial_calls: u32,
    trial_successes: u32,
}

/// Shared circuit breaker for one remote dependency.
///
/// Created once at process start and shared (via `Arc`) by every concurrent
/// caller of that dependency. All state lives behind a single mutex so the
/// window, the mode, and the trial counters can never disagree.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a breaker for the named dependency, starting CLOSED.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                trial_calls: 0,
                trial_successes: 0,
            }),
        }
    }

    /// Returns the dependency name this breaker guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current mode, applying the OPEN -> HALF_OPEN timer first.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        inner.state
    }

    /// Asks permission for one call attempt.
    ///
    /// In HALF_OPEN this also reserves one of the permitted trial slots, so
    /// concurrent callers cannot over-subscribe the trial budget.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.lock();
        self.refresh(&mut inner);

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.trial_calls < self.config.permitted_calls_in_half_open {
                    inner.trial_calls += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => self.push_outcome(&mut inner, Outcome::Success),
            CircuitState::HalfOpen => {
                inner.trial_successes += 1;
                if inner.trial_successes >= self.config.permitted_calls_in_half_open {
                    self.transition_to_closed(&mut inner);
                }
            }
            CircuitState::Open => {
                // A call that was in flight when the breaker opened; its
                // outcome no longer influences the window.
                tracing::debug!(dependency = %self.name, "success recorded while OPEN, ignored");
            }
        }
    }

    /// Records a failed call (timeout, connection error, bad response).
    pub fn record_failure(&self) {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => {
                self.push_outcome(&mut inner, Outcome::Failure);
                if inner.window.len() >= self.config.minimum_calls
                    && Self::window_failure_rate(&inner.window)
                        >= self.config.failure_rate_threshold
                {
                    self.transition_to_open(&mut inner);
                }
            }
            CircuitState::HalfOpen => self.transition_to_open(&mut inner),
            CircuitState::Open => {
                tracing::debug!(dependency = %self.name, "failure recorded while OPEN, ignored");
            }
        }
    }

    /// Returns the failure ratio over the current sliding window.
    pub fn failure_rate(&self) -> f64 {
        let inner = self.lock();
        Self::window_failure_rate(&inner.window)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies the time-based OPEN -> HALF_OPEN transition.
    fn refresh(&self, inner: &mut BreakerInner) {
        if inner.state == CircuitState::Open
            && let Some(opened) = inner.opened_at
            && opened.elapsed() >= self.config.wait_duration_in_open
        {
            inner.state = CircuitState::HalfOpen;
            inner.trial_calls = 0;
            inner.trial_successes = 0;
            tracing::info!(dependency = %self.name, "circuit breaker half-open, probing");
        }
    }

    fn push_outcome(&self, inner: &mut BreakerInner, outcome: Outcome) {
        inner.window.push_back(outcome);
        while inner.window.len() > self.config.sliding_window_size {
            inner.window.pop_front();
        }
    }

    fn transition_to_open(&self, inner: &mut BreakerInner) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        metrics::counter!("circuit_breaker_opened_total", "dependency" => self.name.clone())
            .increment(1);
        tracing::warn!(
            dependency = %self.name,
            failure_rate = Self::window_failure_rate(&inner.window),
            "circuit breaker opened"
        );
    }

    fn transition_to_closed(&self, inner: &mut BreakerInner) {
        inner.state = CircuitState::Closed;
        inner.window.clear();
        inner.opened_at = None;
        inner.trial_calls = 0;
        inner.trial_successes = 0;
        tracing::info!(dependency = %self.name, "circuit breaker closed");
    }

    fn window_failure_rate(window: &VecDeque<Outcome>) -> f64 {
        if window.is_empty() {
            return 0.0;
        }
        let failures = window.iter().filter(|o| **o == Outcome::Failure).count();
        failures as f64 / window.len() as f64
    }
}
