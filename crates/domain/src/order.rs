//! Order aggregate.

use common::{OrderId, OrderNumber, SkuCode};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::value_objects::{Money, OrderLineItem};

/// An order assembled from an inbound request.
///
/// The order and its line items form one unit: they are persisted together
/// or not at all. The order number is generated once at assembly time and
/// is the only piece of the order that travels on the order-placed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: OrderNumber,
    line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Assembles a new order from line items, generating a fresh order number.
    ///
    /// Line items are kept in request order; duplicate SKUs are preserved.
    pub fn new(line_items: Vec<OrderLineItem>) -> Result<Self, OrderError> {
        if line_items.is_empty() {
            return Err(OrderError::NoLineItems);
        }
        for item in &line_items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: item.quantity,
                });
            }
            if !item.unit_price.is_positive() {
                return Err(OrderError::InvalidPrice {
                    price: item.unit_price.cents(),
                });
            }
        }

        Ok(Self {
            id: OrderId::new(),
            order_number: OrderNumber::generate(),
            line_items,
        })
    }

    /// Reconstitutes a persisted order.
    pub fn from_parts(
        id: OrderId,
        order_number: OrderNumber,
        line_items: Vec<OrderLineItem>,
    ) -> Self {
        Self {
            id,
            order_number,
            line_items,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the order number.
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Returns the line items in request order.
    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    /// Returns the number of line items.
    pub fn line_item_count(&self) -> usize {
        self.line_items.len()
    }

    /// Collects the SKU codes of all line items.
    ///
    /// Order is preserved and duplicates are kept, matching the shape of
    /// the request the order was assembled from.
    pub fn sku_codes(&self) -> Vec<SkuCode> {
        self.line_items
            .iter()
            .map(|item| item.sku_code.clone())
            .collect()
    }

    /// Returns the order total across all line items.
    pub fn total_amount(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.total_price())
    }
}
