//! Domain layer for the order placement system.
//!
//! This crate provides the core domain types:
//! - Order aggregate with its line items and generated order number
//! - Money and OrderLineItem value objects
//! - InventoryStatus and the StockReport decision policy
//!
//! Everything here is pure data and policy; remote calls, persistence,
//! and event emission live in their own crates.

pub mod error;
pub mod inventory;
pub mod order;
pub mod value_objects;

pub use error::OrderError;
pub use inventory::{InventoryStatus, StockReport};
pub use order::Order;
pub use value_objects::{Money, OrderLineItem};
