//! Order placement error types.

use common::SkuCode;
use domain::OrderError;
use order_store::StoreError;
use thiserror::Error;

fn format_sku_list(skus: &[SkuCode]) -> String {
    skus.iter()
        .map(SkuCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while placing an order.
///
/// `OutOfStock` and `RemoteUnavailable` are expected rejection outcomes;
/// only `Persistence` represents an internal fault.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The request could not be turned into a valid order.
    #[error("invalid order request: {0}")]
    InvalidOrder(#[from] OrderError),

    /// At least one requested SKU is not in stock (or was missing from
    /// the inventory response).
    #[error("products not in stock: {}", format_sku_list(.skus))]
    OutOfStock { skus: Vec<SkuCode> },

    /// Availability could not be verified; the inventory dependency is
    /// unreachable or its circuit breaker is open.
    #[error("could not verify product availability")]
    RemoteUnavailable,

    /// The order transaction failed to commit. Nothing was persisted and
    /// no event was published.
    #[error("failed to persist order: {0}")]
    Persistence(#[from] StoreError),
}
