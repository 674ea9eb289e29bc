//! Order persistence for the order placement system.
//!
//! An order and its line items are stored as one unit: the write happens
//! inside a single transaction, opened only after the stock check has
//! already completed, so no transaction is ever held across a network call.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
