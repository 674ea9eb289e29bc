//! Inventory query results and the stock decision policy.

use std::collections::HashSet;

use common::SkuCode;
use serde::{Deserialize, Serialize};

/// Per-SKU availability reported by the inventory dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStatus {
    /// The SKU the report refers to.
    pub sku_code: SkuCode,
    /// Whether the SKU is currently in stock.
    pub in_stock: bool,
}

impl InventoryStatus {
    /// Creates a new inventory status entry.
    pub fn new(sku_code: impl Into<SkuCode>, in_stock: bool) -> Self {
        Self {
            sku_code: sku_code.into(),
            in_stock,
        }
    }
}

/// A verified inventory response for one stock check.
///
/// The remote dependency may legitimately answer for only a subset of the
/// requested SKUs. A SKU that is absent from the report is treated as not
/// in stock: an order must never be committed on unverified availability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockReport {
    statuses: Vec<InventoryStatus>,
}

impl StockReport {
    /// Creates a report from the raw response entries.
    pub fn new(statuses: Vec<InventoryStatus>) -> Self {
        Self { statuses }
    }

    /// Returns the raw entries as received.
    pub fn statuses(&self) -> &[InventoryStatus] {
        &self.statuses
    }

    /// Returns true if the SKU was reported and marked in stock.
    pub fn is_in_stock(&self, sku: &SkuCode) -> bool {
        self.statuses
            .iter()
            .any(|s| &s.sku_code == sku && s.in_stock)
    }

    /// Returns true if every requested SKU is reported in stock.
    pub fn all_available(&self, requested: &[SkuCode]) -> bool {
        requested.iter().all(|sku| self.is_in_stock(sku))
    }

    /// Returns the requested SKUs that are missing from the report or
    /// reported out of stock, deduplicated in request order.
    pub fn unavailable_skus(&self, requested: &[SkuCode]) -> Vec<SkuCode> {
        let mut seen: HashSet<&SkuCode> = HashSet::new();
        requested
            .iter()
            .filter(|sku| !self.is_in_stock(sku))
            .filter(|sku| seen.insert(*sku))
            .cloned()
            .collect()
    }
}
