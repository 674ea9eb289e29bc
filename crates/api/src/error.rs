//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orchestrator::PlaceOrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Order placement outcome that is not a success.
    PlaceOrder(PlaceOrderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PlaceOrder(err) => place_order_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn place_order_error_to_response(err: PlaceOrderError) -> (StatusCode, String) {
    match &err {
        PlaceOrderError::InvalidOrder(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        PlaceOrderError::OutOfStock { .. } => (
            StatusCode::CONFLICT,
            "Product is not in stock, please try again later".to_string(),
        ),
        PlaceOrderError::RemoteUnavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Could not verify product availability, please try again later".to_string(),
        ),
        PlaceOrderError::Persistence(_) => {
            tracing::error!(error = %err, "order persistence failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl From<PlaceOrderError> for ApiError {
    fn from(err: PlaceOrderError) -> Self {
        ApiError::PlaceOrder(err)
    }
}
