//! Application configuration loaded from environment variables.

use std::time::Duration;

use resilience::{ResilienceConfig, RetryPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `INVENTORY_SERVICE_URLS` — comma-separated instance base URLs for the
///   inventory dependency (default: `"http://localhost:8082"`)
/// - `DATABASE_URL` — Postgres connection string; when absent the server
///   runs on the in-memory order store
/// - `INVENTORY_CALL_TIMEOUT_MS` — per-attempt timeout (default: `2000`)
/// - `INVENTORY_MAX_ATTEMPTS` — total call attempts (default: `3`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub inventory_instances: Vec<String>,
    pub database_url: Option<String>,
    pub inventory_call_timeout: Duration,
    pub inventory_max_attempts: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            inventory_instances: std::env::var("INVENTORY_SERVICE_URLS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.inventory_instances),
            database_url: std::env::var("DATABASE_URL").ok(),
            inventory_call_timeout: std::env::var("INVENTORY_CALL_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.inventory_call_timeout),
            inventory_max_attempts: std::env::var("INVENTORY_MAX_ATTEMPTS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.inventory_max_attempts),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the resilience settings for the inventory dependency.
    pub fn inventory_resilience(&self) -> ResilienceConfig {
        ResilienceConfig {
            retry: RetryPolicy {
                max_attempts: self.inventory_max_attempts,
                ..Default::default()
            },
            call_timeout: self.inventory_call_timeout,
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            inventory_instances: vec!["http://localhost:8082".to_string()],
            database_url: None,
            inventory_call_timeout: Duration::from_millis(2000),
            inventory_max_attempts: 3,
        }
    }
}
