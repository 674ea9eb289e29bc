//! The order placement flow.

use common::OrderNumber;
use domain::{Money, Order, OrderLineItem};
use events::{EventPublisher, OrderPlacedEvent};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::client::resilient::{StockCheck, StockChecker};
use crate::error::PlaceOrderError;

/// Inbound order request, already decoded from the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    /// Requested lines, in order; duplicate SKUs are legitimate.
    pub line_items: Vec<LineItemRequest>,
}

/// One requested line.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemRequest {
    /// SKU code of the product.
    pub sku_code: String,
    /// Unit price in cents.
    pub price: i64,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Successful placement outcome.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    /// The generated order number the caller can track the order by.
    pub order_number: OrderNumber,
}

/// Coordinates one order placement across the inventory dependency, the
/// order store, and the event transport.
///
/// The commit decision is strict: every requested SKU must be reported in
/// stock by the remote check before anything is persisted. The persistence
/// transaction is opened only after the remote check returns, and the
/// order-placed event goes out only after the transaction commits.
pub struct OrderOrchestrator<C, S, P>
where
    C: StockChecker,
    S: OrderStore,
    P: EventPublisher,
{
    stock: C,
    store: S,
    publisher: P,
}

impl<C, S, P> OrderOrchestrator<C, S, P>
where
    C: StockChecker,
    S: OrderStore,
    P: EventPublisher,
{
    /// Creates a new orchestrator.
    pub fn new(stock: C, store: S, publisher: P) -> Self {
        Self {
            stock,
            store,
            publisher,
        }
    }

    /// Places an order.
    ///
    /// Returns a confirmation carrying the generated order number, or a
    /// typed rejection: out of stock, availability unverifiable, or a
    /// persistence fault.
    #[tracing::instrument(skip(self, request), fields(line_items = request.line_items.len()))]
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<OrderConfirmation, PlaceOrderError> {
        metrics::counter!("orders_requested_total").increment(1);
        let started = std::time::Instant::now();

        let line_items: Vec<OrderLineItem> = request
            .line_items
            .iter()
            .map(|line| {
                OrderLineItem::new(
                    line.sku_code.as_str(),
                    Money::from_cents(line.price),
                    line.quantity,
                )
            })
            .collect();
        let order = Order::new(line_items)?;

        let skus = order.sku_codes();
        let report = match self.stock.check_stock(&skus).await {
            StockCheck::Verified(report) => report,
            StockCheck::Unverified => {
                metrics::counter!("orders_rejected_total", "reason" => "remote_unavailable")
                    .increment(1);
                return Err(PlaceOrderError::RemoteUnavailable);
            }
        };

        let unavailable = report.unavailable_skus(&skus);
        if !unavailable.is_empty() {
            metrics::counter!("orders_rejected_total", "reason" => "out_of_stock").increment(1);
            tracing::info!(
                order_number = %order.order_number(),
                skus = ?unavailable,
                "order rejected, products not in stock"
            );
            return Err(PlaceOrderError::OutOfStock { skus: unavailable });
        }

        // Transaction opens here, after the remote check has completed.
        self.store.save(&order).await?;

        let event = OrderPlacedEvent::new(order.order_number().clone());
        if let Err(error) = self.publisher.publish(&event).await {
            // The order stays committed; the lost announcement is an
            // accepted at-least-once gap, surfaced for reconciliation.
            metrics::counter!("orders_publish_failures_total").increment(1);
            tracing::error!(
                order_number = %order.order_number(),
                %error,
                "order committed but order-placed event was lost"
            );
        }

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("place_order_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_number = %order.order_number(), "order placed");

        Ok(OrderConfirmation {
            order_number: order.order_number().clone(),
        })
    }
}
