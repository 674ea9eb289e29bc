//! Order placement orchestration.
//!
//! This crate owns the cross-service path of placing an order:
//! 1. Assemble the order aggregate from the inbound request
//! 2. Ask the inventory dependency about every requested SKU through the
//!    resilient client (discovery, circuit breaker, retry, timeout,
//!    fallback)
//! 3. Commit the order transactionally only when every SKU is verified
//!    in stock
//! 4. Announce the commit on the order-placed topic
//!
//! Expected failures (out of stock, dependency unavailable) surface as
//! typed rejections, never as raw faults.

pub mod client;
pub mod error;
pub mod orchestrator;

pub use client::{
    HttpInventoryTransport, INVENTORY_SERVICE, InMemoryStockChecker, InventoryTransport,
    ResilientInventoryClient, StockCheck, StockChecker,
};
pub use error::PlaceOrderError;
pub use orchestrator::{LineItemRequest, OrderConfirmation, OrderOrchestrator, PlaceOrderRequest};
