pub mod health;
pub mod pricing;
pub mod products;

use apiary_common::api::ApiErrorResponse;
use apiary_common::error::AppError;
use axum::http::StatusCode;
use axum::{Json, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health::health))
        .route(
            "/api/v1/pricing/preview",
            axum::routing::post(pricing::preview),
        )
        .route("/api/v1/products", axum::routing::post(products::create))
        .route(
            "/api/v1/products/{product_id}/edit",
            axum::routing::get(products::load_for_edit),
        )
        .with_state(state)
}

pub(crate) fn error_response(err: &AppError) -> (StatusCode, Json<ApiErrorResponse>) {
    let message = match err {
        AppError::Config(_) => {
            // Operator mistake, not user input: alert loudly and keep the
            // detail out of the response body.
            tracing::error!(error = %err, "fee configuration rejected");
            "pricing configuration unavailable".to_string()
        }
        _ => err.to_string(),
    };

    (
        err.status_code(),
        Json(ApiErrorResponse {
            code: err.code().to_string(),
            message,
            request_id: None,
        }),
    )
}
