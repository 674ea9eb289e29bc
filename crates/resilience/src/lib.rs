//! Resilience primitives for calls to remote dependencies.
//!
//! This crate provides the pieces the order flow composes around its
//! remote inventory call:
//! - [`CircuitBreaker`]: a shared CLOSED/OPEN/HALF_OPEN state machine over a
//!   sliding window of call outcomes
//! - [`RetryPolicy`] / [`ExponentialBackoff`]: bounded retries with jittered
//!   backoff delays
//! - [`execute`]: the composable wrapper applying timeout, retry, and the
//!   breaker around a raw async call
//! - [`ServiceRegistry`] / [`SelectionStrategy`]: discovery-based resolution
//!   with pluggable instance selection
//!
//! None of this is specific to inventory; any remote dependency gets its own
//! breaker instance and configuration.

pub mod breaker;
pub mod config;
pub mod discovery;
pub mod error;
pub mod execute;
pub mod retry;

pub use breaker::{CircuitBreaker, CircuitState};
pub use config::{CircuitBreakerConfig, ResilienceConfig};
pub use discovery::{
    CachingRegistry, InstanceAddress, RoundRobin, SelectionStrategy, ServiceRegistry,
    StaticRegistry,
};
pub use error::{CallFailure, ResilienceError};
pub use execute::execute;
pub use retry::{ExponentialBackoff, RetryPolicy};
