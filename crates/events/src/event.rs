//! Event payloads.

use common::OrderNumber;
use serde::{Deserialize, Serialize};

/// Announcement that an order was committed.
///
/// Carries the order number only; consumers look up whatever else they
/// need. Produced once per successful commit (best-effort).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedEvent {
    /// The committed order's order number.
    pub order_number: OrderNumber,
}

impl OrderPlacedEvent {
    /// Creates an event for the given order number.
    pub fn new(order_number: OrderNumber) -> Self {
        Self { order_number }
    }
}
