//! Service discovery: resolving a logical service name to live instances
//! and picking one per call attempt.
//!
//! The registry itself is an external system; this module is the client
//! side of it, decoupled from the HTTP transport so resolution and
//! selection can be swapped independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One resolvable network location of a service instance, e.g.
/// `http://10.0.3.17:8082`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceAddress(String);

impl InstanceAddress {
    /// Creates an instance address from a base URL string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstanceAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstanceAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Resolves a logical service name to the currently known live instances.
///
/// An empty list is a legitimate answer (nothing registered, registry cold);
/// callers must treat it as "dependency unavailable", not as a fault.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Returns the live instances registered under `service`.
    async fn resolve(&self, service: &str) -> Vec<InstanceAddress>;
}

/// Registry with a fixed instance list per service, configured at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    services: HashMap<String, Vec<InstanceAddress>>,
}

impl StaticRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the instances for a service, replacing any existing entry.
    pub fn with_service(
        mut self,
        service: impl Into<String>,
        instances: Vec<InstanceAddress>,
    ) -> Self {
        self.services.insert(service.into(), instances);
        self
    }
}

#[async_trait]
impl ServiceRegistry for StaticRegistry {
    async fn resolve(&self, service: &str) -> Vec<InstanceAddress> {
        self.services.get(service).cloned().unwrap_or_default()
    }
}

struct CachedEntry {
    instances: Vec<InstanceAddress>,
    fetched_at: Instant,
}

/// Caches resolutions from a slower upstream registry.
///
/// A cached snapshot is served until it is older than the refresh interval,
/// then re-resolved on the next lookup. Serving a possibly stale list for
/// one interval matches how registry clients behave between refresh ticks.
pub struct CachingRegistry<R> {
    upstream: R,
    refresh_interval: Duration,
    cache: RwLock<HashMap<String, CachedEntry>>,
}

impl<R: ServiceRegistry> CachingRegistry<R> {
    /// Wraps an upstream registry with a refresh interval.
    pub fn new(upstream: R, refresh_interval: Duration) -> Self {
        Self {
            upstream,
            refresh_interval,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<R: ServiceRegistry> ServiceRegistry for CachingRegistry<R> {
    async fn resolve(&self, service: &str) -> Vec<InstanceAddress> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(service)
                && entry.fetched_at.elapsed() < self.refresh_interval
            {
                return entry.instances.clone();
            }
        }

        let instances = self.upstream.resolve(service).await;
        tracing::debug!(service, count = instances.len(), "registry snapshot refreshed");

        let mut cache = self.cache.write().await;
        cache.insert(
            service.to_string(),
            CachedEntry {
                instances: instances.clone(),
                fetched_at: Instant::now(),
            },
        );
        instances
    }
}

/// Picks one instance out of a resolved list for a single call attempt.
pub trait SelectionStrategy: Send + Sync {
    /// Returns the instance to use, or `None` for an empty list.
    fn select<'a>(&self, instances: &'a [InstanceAddress]) -> Option<&'a InstanceAddress>;
}

/// Default selection strategy: rotate through the instance list.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    /// Creates a round-robin selector starting at the first instance.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobin {
    fn select<'a>(&self, instances: &'a [InstanceAddress]) -> Option<&'a InstanceAddress> {
        if instances.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % instances.len();
        Some(&instances[index])
    }
}
