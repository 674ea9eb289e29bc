//! Failure classification for remote calls.

use std::time::Duration;

use thiserror::Error;

/// A single failed call attempt against a remote dependency.
///
/// The variant decides whether the attempt may be retried: transport-level
/// trouble is transient, a response we cannot interpret is not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFailure {
    /// The attempt exceeded its timeout budget and was cancelled.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established or broke mid-flight.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The remote answered with a non-success HTTP status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl CallFailure {
    /// Returns true if a fresh attempt could plausibly succeed.
    ///
    /// Server-side and transport failures are retryable; a malformed
    /// response or a client error will not get better by asking again.
    pub fn is_retryable(&self) -> bool {
        match self {
            CallFailure::Timeout(_) | CallFailure::Connection(_) => true,
            CallFailure::Status(code) => {
                *code == 408 || *code == 429 || (500..600).contains(code)
            }
            CallFailure::Malformed(_) => false,
        }
    }
}

/// Terminal outcome of a resilient call that did not produce a value.
///
/// Callers turn this into their fallback result; it never escapes as an
/// unhandled fault for expected failure modes.
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// The circuit breaker is open; the call never reached the network.
    #[error("circuit breaker '{0}' is open")]
    CircuitOpen(String),

    /// Every permitted attempt failed.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: CallFailure },

    /// The first non-retryable failure aborted the call.
    #[error("non-retryable failure: {0}")]
    NonRetryable(CallFailure),
}
