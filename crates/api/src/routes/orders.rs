//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use events::EventPublisher;
use order_store::OrderStore;
use orchestrator::{LineItemRequest, OrderOrchestrator, PlaceOrderRequest, StockChecker};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<C, S, P>
where
    C: StockChecker,
    S: OrderStore,
    P: EventPublisher,
{
    pub orchestrator: OrderOrchestrator<C, S, P>,
}

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub order_line_items: Vec<OrderLineItemDto>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemDto {
    pub sku_code: String,
    pub price: i64,
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedResponse {
    pub order_number: String,
    pub message: String,
}

// -- Handlers --

/// POST /orders — place an order.
///
/// Succeeds with 201 and the generated order number only when every
/// requested SKU is verified in stock and the order committed. Rejections
/// are distinguished by status: 409 out of stock, 503 availability not
/// verifiable.
#[tracing::instrument(skip(state, req))]
pub async fn place<C, S, P>(
    State(state): State<Arc<AppState<C, S, P>>>,
    Json(req): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderPlacedResponse>), ApiError>
where
    C: StockChecker + 'static,
    S: OrderStore + 'static,
    P: EventPublisher + 'static,
{
    let request = PlaceOrderRequest {
        line_items: req
            .order_line_items
            .into_iter()
            .map(|line| LineItemRequest {
                sku_code: line.sku_code,
                price: line.price,
                quantity: line.quantity,
            })
            .collect(),
    };

    let confirmation = state.orchestrator.place_order(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderPlacedResponse {
            order_number: confirmation.order_number.to_string(),
            message: "Order placed successfully".to_string(),
        }),
    ))
}
