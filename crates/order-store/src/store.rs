use async_trait::async_trait;
use common::OrderNumber;
use domain::Order;

use crate::Result;

/// Core trait for order persistence implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order together with all of its line items.
    ///
    /// The write is atomic: either the order and every line item are
    /// committed, or nothing is. Fails with `DuplicateOrderNumber` if the
    /// order number has already been committed.
    async fn save(&self, order: &Order) -> Result<()>;

    /// Loads a persisted order by its order number.
    ///
    /// Returns `None` if no such order was committed. Line items come back
    /// in their original request order.
    async fn find_by_order_number(&self, order_number: &OrderNumber) -> Result<Option<Order>>;

    /// Returns the number of committed orders.
    async fn count(&self) -> Result<u64>;
}
