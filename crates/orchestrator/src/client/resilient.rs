//! Resilient inventory client: discovery, circuit breaking, retry,
//! timeout, and fallback composed around the raw transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::SkuCode;
use domain::StockReport;
use resilience::{
    CircuitBreaker, ResilienceConfig, RetryPolicy, RoundRobin, SelectionStrategy, ServiceRegistry,
};

use crate::client::transport::InventoryTransport;

/// Logical registry name of the inventory dependency.
pub const INVENTORY_SERVICE: &str = "inventory-service";

/// Outcome of a resilient stock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCheck {
    /// The dependency answered; the report carries its entries as received.
    Verified(StockReport),
    /// Availability could not be verified (breaker open, retries exhausted,
    /// or no instance resolvable). Degraded fallback result, not a fault.
    Unverified,
}

/// The stock check as the orchestrator sees it.
///
/// Never fails for expected failure modes: when the dependency cannot be
/// reached, the answer is [`StockCheck::Unverified`] and the caller renders
/// a "try again later" outcome.
#[async_trait]
pub trait StockChecker: Send + Sync {
    /// Checks availability for every requested SKU.
    async fn check_stock(&self, skus: &[SkuCode]) -> StockCheck;
}

/// Production stock checker.
///
/// Resolves live instances through the registry, picks one per attempt via
/// the selection strategy, and runs each attempt under the shared circuit
/// breaker with per-attempt timeout and backed-off retries.
pub struct ResilientInventoryClient<R, T> {
    registry: R,
    transport: T,
    strategy: Box<dyn SelectionStrategy>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl<R, T> ResilientInventoryClient<R, T>
where
    R: ServiceRegistry,
    T: InventoryTransport,
{
    /// Creates a client with round-robin instance selection.
    pub fn new(
        registry: R,
        transport: T,
        breaker: Arc<CircuitBreaker>,
        config: &ResilienceConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            strategy: Box::new(RoundRobin::new()),
            breaker,
            retry: config.retry.clone(),
            call_timeout: config.call_timeout,
        }
    }

    /// Replaces the instance selection strategy.
    pub fn with_strategy(mut self, strategy: Box<dyn SelectionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }
}

#[async_trait]
impl<R, T> StockChecker for ResilientInventoryClient<R, T>
where
    R: ServiceRegistry,
    T: InventoryTransport,
{
    #[tracing::instrument(skip(self, skus), fields(sku_count = skus.len()))]
    async fn check_stock(&self, skus: &[SkuCode]) -> StockCheck {
        let instances = self.registry.resolve(INVENTORY_SERVICE).await;
        if instances.is_empty() {
            tracing::warn!(
                service = INVENTORY_SERVICE,
                "no live instances resolvable, answering with fallback"
            );
            metrics::counter!("stock_check_fallbacks_total", "reason" => "no_instances")
                .increment(1);
            return StockCheck::Unverified;
        }

        let transport = &self.transport;
        let strategy = self.strategy.as_ref();
        let result = resilience::execute(&self.breaker, &self.retry, self.call_timeout, || {
            // Selection happens per attempt so retries rotate instances.
            let instance = strategy
                .select(&instances)
                .cloned()
                .unwrap_or_else(|| instances[0].clone());
            async move { transport.fetch_stock(&instance, skus).await }
        })
        .await;

        match result {
            Ok(statuses) => StockCheck::Verified(StockReport::new(statuses)),
            Err(error) => {
                tracing::warn!(
                    service = INVENTORY_SERVICE,
                    %error,
                    "stock check failed, answering with fallback"
                );
                metrics::counter!("stock_check_fallbacks_total", "reason" => "call_failed")
                    .increment(1);
                StockCheck::Unverified
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::InventoryStatus;
    use resilience::{
        CallFailure, CircuitBreakerConfig, CircuitState, InstanceAddress, StaticRegistry,
    };
    use std::sync::Mutex;
    use std::time::Instant;

    /// Scripted transport: pops one outcome per attempt, records the
    /// instance each attempt was sent to.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<Vec<Result<Vec<InventoryStatus>, CallFailure>>>,
        instances_called: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn scripted(outcomes: Vec<Result<Vec<InventoryStatus>, CallFailure>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                instances_called: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.instances_called.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InventoryTransport for ScriptedTransport {
        async fn fetch_stock(
            &self,
            instance: &InstanceAddress,
            _skus: &[SkuCode],
        ) -> Result<Vec<InventoryStatus>, CallFailure> {
            self.instances_called
                .lock()
                .unwrap()
                .push(instance.as_str().to_string());
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Err(CallFailure::Connection("script exhausted".into()));
            }
            outcomes.remove(0)
        }
    }

    fn registry(instances: &[&str]) -> StaticRegistry {
        StaticRegistry::new().with_service(
            INVENTORY_SERVICE,
            instances.iter().map(|i| InstanceAddress::from(*i)).collect(),
        )
    }

    fn quick_config() -> ResilienceConfig {
        ResilienceConfig {
            retry: RetryPolicy {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(5),
                jitter: 0.0,
                ..Default::default()
            },
            call_timeout: Duration::from_millis(100),
            ..Default::default()
        }
    }

    fn breaker() -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(
            INVENTORY_SERVICE,
            CircuitBreakerConfig {
                wait_duration_in_open: Duration::from_secs(60),
                ..Default::default()
            },
        ))
    }

    fn skus(codes: &[&str]) -> Vec<SkuCode> {
        codes.iter().map(|c| SkuCode::new(*c)).collect()
    }

    #[tokio::test]
    async fn verified_report_on_successful_call() {
        let transport =
            ScriptedTransport::scripted(vec![Ok(vec![InventoryStatus::new("iphone_13", true)])]);
        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082"]),
            transport,
            breaker(),
            &quick_config(),
        );

        let check = client.check_stock(&skus(&["iphone_13"])).await;

        match check {
            StockCheck::Verified(report) => assert!(report.is_in_stock(&SkuCode::new("iphone_13"))),
            StockCheck::Unverified => panic!("expected a verified report"),
        }
    }

    #[tokio::test]
    async fn retries_rotate_across_instances() {
        let transport = Arc::new(ScriptedTransport::scripted(vec![
            Err(CallFailure::Connection("refused".into())),
            Err(CallFailure::Connection("refused".into())),
            Ok(vec![InventoryStatus::new("iphone_13", true)]),
        ]));
        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082", "http://inv-b:8082"]),
            transport.clone(),
            breaker(),
            &quick_config(),
        );

        let check = client.check_stock(&skus(&["iphone_13"])).await;

        assert!(matches!(check, StockCheck::Verified(_)));
        assert_eq!(
            transport.calls(),
            vec!["http://inv-a:8082", "http://inv-b:8082", "http://inv-a:8082"]
        );
    }

    #[tokio::test]
    async fn fallback_when_retries_exhausted() {
        let transport = ScriptedTransport::scripted(vec![
            Err(CallFailure::Connection("refused".into())),
            Err(CallFailure::Connection("refused".into())),
            Err(CallFailure::Connection("refused".into())),
        ]);
        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082"]),
            transport,
            breaker(),
            &quick_config(),
        );

        let check = client.check_stock(&skus(&["iphone_13"])).await;
        assert_eq!(check, StockCheck::Unverified);
    }

    #[tokio::test]
    async fn fallback_without_resolvable_instances() {
        let transport = ScriptedTransport::default();
        let client = ResilientInventoryClient::new(
            StaticRegistry::new(),
            transport,
            breaker(),
            &quick_config(),
        );

        let check = client.check_stock(&skus(&["iphone_13"])).await;
        assert_eq!(check, StockCheck::Unverified);
    }

    #[tokio::test]
    async fn open_breaker_answers_fallback_without_calling_transport() {
        let shared_breaker = breaker();
        // Drive the breaker open: consecutive timeouts past the threshold
        for _ in 0..5 {
            shared_breaker.record_failure();
        }
        assert_eq!(shared_breaker.state(), CircuitState::Open);

        let transport = Arc::new(ScriptedTransport::default());
        let started = Instant::now();
        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082"]),
            transport.clone(),
            shared_breaker,
            &quick_config(),
        );

        let check = client.check_stock(&skus(&["iphone_13"])).await;

        assert_eq!(check, StockCheck::Unverified);
        assert!(transport.calls().is_empty());
        // Short-circuited: answered in a fraction of the call timeout
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn timed_out_attempts_fall_back_after_retry_budget() {
        struct HangingTransport;

        #[async_trait]
        impl InventoryTransport for HangingTransport {
            async fn fetch_stock(
                &self,
                _instance: &InstanceAddress,
                _skus: &[SkuCode],
            ) -> Result<Vec<InventoryStatus>, CallFailure> {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(vec![])
            }
        }

        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082"]),
            HangingTransport,
            breaker(),
            &quick_config(),
        );

        let started = Instant::now();
        let check = client.check_stock(&skus(&["iphone_13"])).await;

        assert_eq!(check, StockCheck::Unverified);
        // Three attempts at 100ms each plus millisecond backoffs
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn consecutive_timeouts_open_breaker_and_short_circuit_next_call() {
        use std::sync::atomic::{AtomicU32, Ordering};

        /// Transport that never answers within the timeout, counting calls.
        #[derive(Default)]
        struct StalledTransport {
            calls: AtomicU32,
        }

        #[async_trait]
        impl InventoryTransport for StalledTransport {
            async fn fetch_stock(
                &self,
                _instance: &InstanceAddress,
                _skus: &[SkuCode],
            ) -> Result<Vec<InventoryStatus>, CallFailure> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(vec![])
            }
        }

        let config = ResilienceConfig {
            breaker: CircuitBreakerConfig {
                failure_rate_threshold: 0.5,
                sliding_window_size: 10,
                minimum_calls: 5,
                wait_duration_in_open: Duration::from_secs(60),
                permitted_calls_in_half_open: 3,
            },
            retry: RetryPolicy {
                max_attempts: 1,
                ..Default::default()
            },
            call_timeout: Duration::from_millis(20),
        };
        let shared_breaker = Arc::new(CircuitBreaker::new(INVENTORY_SERVICE, config.breaker.clone()));
        let transport = Arc::new(StalledTransport::default());
        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082"]),
            transport.clone(),
            shared_breaker.clone(),
            &config,
        );

        // Five consecutive timed-out calls push the failure ratio past the
        // threshold and open the breaker
        for _ in 0..5 {
            assert_eq!(client.check_stock(&skus(&["iphone_13"])).await, StockCheck::Unverified);
        }
        assert_eq!(shared_breaker.state(), CircuitState::Open);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);

        // The sixth call answers via fallback well inside the timeout and
        // never reaches the transport
        let started = Instant::now();
        let check = client.check_stock(&skus(&["iphone_13"])).await;

        assert_eq!(check, StockCheck::Unverified);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn malformed_response_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::scripted(vec![
            Err(CallFailure::Malformed("expected JSON array".into())),
            Ok(vec![InventoryStatus::new("iphone_13", true)]),
        ]));
        let client = ResilientInventoryClient::new(
            registry(&["http://inv-a:8082"]),
            transport.clone(),
            breaker(),
            &quick_config(),
        );

        let check = client.check_stock(&skus(&["iphone_13"])).await;

        // The second scripted outcome must never be reached
        assert_eq!(check, StockCheck::Unverified);
        assert_eq!(transport.calls().len(), 1);
    }
}
