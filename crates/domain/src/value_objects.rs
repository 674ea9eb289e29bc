//! Value objects for the order domain.

use common::SkuCode;
use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.cents / 100;
        let rem = self.cents.abs() % 100;
        if self.cents < 0 {
            write!(f, "-${}.{:02}", dollars.abs(), rem)
        } else {
            write!(f, "${dollars}.{rem:02}")
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

/// A single line of an order: one SKU at a unit price and quantity.
///
/// Line items are kept exactly as requested; the same SKU may appear
/// on more than one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// The SKU being ordered.
    pub sku_code: SkuCode,

    /// Price per unit in cents.
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: u32,
}

impl OrderLineItem {
    /// Creates a new order line item.
    pub fn new(sku_code: impl Into<SkuCode>, unit_price: Money, quantity: u32) -> Self {
        Self {
            sku_code: sku_code.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the total price for this line (quantity * unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_display_formats_cents() {
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn money_multiply_scales_by_quantity() {
        let price = Money::from_cents(1000);
        assert_eq!(price.multiply(3).cents(), 3000);
    }

    #[test]
    fn line_item_total_price() {
        let item = OrderLineItem::new("iphone_13", Money::from_cents(120000), 2);
        assert_eq!(item.total_price().cents(), 240000);
    }

    #[test]
    fn line_item_serialization_roundtrip() {
        let item = OrderLineItem::new("iphone_13", Money::from_cents(120000), 1);
        let json = serde_json::to_string(&item).unwrap();
        let deserialized: OrderLineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }
}
