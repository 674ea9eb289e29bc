//! Raw inventory call: one attempt against one resolved instance.

use async_trait::async_trait;
use common::SkuCode;
use domain::InventoryStatus;
use resilience::{CallFailure, InstanceAddress};
use serde::Deserialize;

/// One raw stock query against a single service instance.
///
/// Implementations perform exactly one attempt; timeout, retry, and
/// circuit breaking are layered on top by the resilient client.
#[async_trait]
pub trait InventoryTransport: Send + Sync {
    /// Queries the instance for the availability of the given SKUs.
    ///
    /// The response may cover only a subset of the requested SKUs.
    async fn fetch_stock(
        &self,
        instance: &InstanceAddress,
        skus: &[SkuCode],
    ) -> Result<Vec<InventoryStatus>, CallFailure>;
}

#[async_trait]
impl<T: InventoryTransport + ?Sized> InventoryTransport for std::sync::Arc<T> {
    async fn fetch_stock(
        &self,
        instance: &InstanceAddress,
        skus: &[SkuCode],
    ) -> Result<Vec<InventoryStatus>, CallFailure> {
        (**self).fetch_stock(instance, skus).await
    }
}

/// Wire shape of one inventory response entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryStatusDto {
    sku_code: String,
    in_stock: bool,
}

impl From<InventoryStatusDto> for InventoryStatus {
    fn from(dto: InventoryStatusDto) -> Self {
        InventoryStatus::new(dto.sku_code, dto.in_stock)
    }
}

/// HTTP transport for the inventory dependency.
///
/// Issues `GET {instance}/api/inventory?skuCode=A&skuCode=B` and decodes
/// the JSON array of per-SKU availability entries.
#[derive(Debug, Clone, Default)]
pub struct HttpInventoryTransport {
    client: reqwest::Client,
}

impl HttpInventoryTransport {
    /// Creates a transport with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryTransport for HttpInventoryTransport {
    async fn fetch_stock(
        &self,
        instance: &InstanceAddress,
        skus: &[SkuCode],
    ) -> Result<Vec<InventoryStatus>, CallFailure> {
        let url = format!("{}/api/inventory", instance.as_str());
        let query: Vec<(&str, &str)> = skus.iter().map(|sku| ("skuCode", sku.as_str())).collect();

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| CallFailure::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallFailure::Status(status.as_u16()));
        }

        let entries: Vec<InventoryStatusDto> = response
            .json()
            .await
            .map_err(|e| CallFailure::Malformed(e.to_string()))?;

        Ok(entries.into_iter().map(InventoryStatus::from).collect())
    }
}
