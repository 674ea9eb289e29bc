use thiserror::Error;

/// Errors that can occur when assembling an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order has no line items.
    #[error("Order has no line items")]
    NoLineItems,

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid unit price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },
}
