//! In-memory stock checker for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SkuCode;
use domain::{InventoryStatus, StockReport};

use crate::client::resilient::{StockCheck, StockChecker};

#[derive(Debug, Default)]
struct CheckerState {
    stock: HashMap<SkuCode, bool>,
    unavailable: bool,
    calls: u32,
}

/// In-memory stock checker for testing and local wiring.
///
/// Answers only for the SKUs it knows about, so requesting an unseeded
/// SKU exercises the subset-response path. Can also be switched to answer
/// with the fallback sentinel, as the real client does when the dependency
/// is unreachable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockChecker {
    state: Arc<RwLock<CheckerState>>,
}

impl InMemoryStockChecker {
    /// Creates a checker with no known SKUs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the availability of a SKU.
    pub fn set_stock(&self, sku: impl Into<SkuCode>, in_stock: bool) {
        self.state.write().unwrap().stock.insert(sku.into(), in_stock);
    }

    /// Makes every subsequent check answer with the fallback sentinel.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Returns the number of checks performed.
    pub fn call_count(&self) -> u32 {
        self.state.read().unwrap().calls
    }
}

#[async_trait]
impl StockChecker for InMemoryStockChecker {
    async fn check_stock(&self, skus: &[SkuCode]) -> StockCheck {
        let mut state = self.state.write().unwrap();
        state.calls += 1;

        if state.unavailable {
            return StockCheck::Unverified;
        }

        let statuses = skus
            .iter()
            .filter_map(|sku| {
                state
                    .stock
                    .get(sku)
                    .map(|in_stock| InventoryStatus::new(sku.clone(), *in_stock))
            })
            .collect();
        StockCheck::Verified(StockReport::new(statuses))
    }
}
