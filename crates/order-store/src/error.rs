use common::OrderNumber;
use thiserror::Error;

/// Errors that can occur when persisting or loading orders.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An order with this order number has already been committed.
    #[error("duplicate order number: {0}")]
    DuplicateOrderNumber(OrderNumber),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
