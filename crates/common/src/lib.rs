//! Shared identifier types used across the order placement crates.

mod types;

pub use types::{OrderId, OrderNumber, SkuCode};
