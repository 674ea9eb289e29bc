//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use api::routes::orders::AppState;
use events::{InProcessBroker, NotificationConsumer, TopicPublisher};
use order_store::{InMemoryOrderStore, PostgresOrderStore};
use orchestrator::{
    HttpInventoryTransport, INVENTORY_SERVICE, OrderOrchestrator, ResilientInventoryClient,
};
use resilience::{CachingRegistry, CircuitBreaker, InstanceAddress, StaticRegistry};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let config = Config::from_env();

    // 3. Event transport and the independent notification consumer
    let broker = InProcessBroker::default();
    tokio::spawn(NotificationConsumer::new(&broker).run());
    let publisher = TopicPublisher::new(broker.clone());

    // 4. Resilient inventory client: registry resolution, shared breaker,
    //    retry with backoff, per-attempt timeout, fallback
    let instances = StaticRegistry::new().with_service(
        INVENTORY_SERVICE,
        config
            .inventory_instances
            .iter()
            .map(|url| InstanceAddress::from(url.as_str()))
            .collect(),
    );
    let registry = CachingRegistry::new(instances, std::time::Duration::from_secs(30));
    let resilience_config = config.inventory_resilience();
    let breaker = Arc::new(CircuitBreaker::new(
        INVENTORY_SERVICE,
        resilience_config.breaker.clone(),
    ));
    let stock = ResilientInventoryClient::new(
        registry,
        HttpInventoryTransport::new(),
        breaker,
        &resilience_config,
    );

    // 5. Order store: Postgres when configured, in-memory otherwise
    let app = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let store = PostgresOrderStore::new(pool);
            store.run_migrations().await.expect("migrations failed");

            let state = Arc::new(AppState {
                orchestrator: OrderOrchestrator::new(stock, store, publisher),
            });
            api::create_app(state, metrics_handle)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders will not survive a restart");
            let store = InMemoryOrderStore::new();

            let state = Arc::new(AppState {
                orchestrator: OrderOrchestrator::new(stock, store, publisher),
            });
            api::create_app(state, metrics_handle)
        }
    };

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
