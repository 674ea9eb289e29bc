use std::sync::Arc;

use async_trait::async_trait;
use common::OrderNumber;
use domain::Order;
use tokio::sync::RwLock;

use crate::store::OrderStore;
use crate::{Result, StoreError};

#[derive(Debug, Default)]
struct InMemoryState {
    orders: Vec<Order>,
    fail_on_save: bool,
}

/// In-memory order store for testing.
///
/// Provides the same interface as the PostgreSQL implementation, plus a
/// failure-injection switch for exercising the persistence error path.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail on subsequent save calls.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Returns true if an order with the given order number was committed.
    pub async fn has_order(&self, order_number: &OrderNumber) -> bool {
        self.state
            .read()
            .await
            .orders
            .iter()
            .any(|o| o.order_number() == order_number)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_save {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }

        if state
            .orders
            .iter()
            .any(|o| o.order_number() == order.order_number())
        {
            return Err(StoreError::DuplicateOrderNumber(
                order.order_number().clone(),
            ));
        }

        state.orders.push(order.clone());
        Ok(())
    }

    async fn find_by_order_number(&self, order_number: &OrderNumber) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .find(|o| o.order_number() == order_number)
            .cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.state.read().await.orders.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, OrderLineItem};

    fn sample_order() -> Order {
        Order::new(vec![
            OrderLineItem::new("iphone_13", Money::from_cents(120000), 1),
            OrderLineItem::new("pixel_8", Money::from_cents(90000), 2),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();

        store.save(&order).await.unwrap();

        let found = store
            .find_by_order_number(order.order_number())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, order);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_order_number_is_rejected() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();

        store.save(&order).await.unwrap();
        let result = store.save(&order).await;

        assert!(matches!(result, Err(StoreError::DuplicateOrderNumber(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn injected_failure_persists_nothing() {
        let store = InMemoryOrderStore::new();
        store.set_fail_on_save(true).await;

        let result = store.save(&sample_order()).await;

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_order_resolves_to_none() {
        let store = InMemoryOrderStore::new();
        let missing = OrderNumber::generate();
        assert!(
            store
                .find_by_order_number(&missing)
                .await
                .unwrap()
                .is_none()
        );
    }
}
