//! HTTP API server with observability for the order placement system.
//!
//! Exposes the order placement endpoint plus health and Prometheus
//! metrics, with structured logging (tracing) on every handler.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use events::{EventPublisher, InProcessBroker, TopicPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore};
use orchestrator::{InMemoryStockChecker, OrderOrchestrator, StockChecker};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, S, P>(state: Arc<AppState<C, S, P>>, metrics_handle: PrometheusHandle) -> Router
where
    C: StockChecker + 'static,
    S: OrderStore + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<C, S, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state on the in-memory stack: seedable stock
/// checker, in-memory order store, and an in-process broker for events.
///
/// Used by tests and local runs without external dependencies; the binary
/// wires the resilient HTTP client and Postgres instead.
pub fn create_default_state() -> (
    Arc<AppState<InMemoryStockChecker, InMemoryOrderStore, TopicPublisher>>,
    InMemoryStockChecker,
    InMemoryOrderStore,
    InProcessBroker,
) {
    let stock = InMemoryStockChecker::new();
    let store = InMemoryOrderStore::new();
    let broker = InProcessBroker::default();
    let publisher = TopicPublisher::new(broker.clone());

    let state = Arc::new(AppState {
        orchestrator: OrderOrchestrator::new(stock.clone(), store.clone(), publisher),
    });

    (state, stock, store, broker)
}
