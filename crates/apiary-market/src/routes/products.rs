use apiary_common::api::{
    ApiErrorResponse, CreateProductRequest, CreateProductResponse, ProductEditResponse,
};
use apiary_common::error::AppError;
use apiary_common::pricing::{quote, reconcile, CommissionSpec};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::routes::error_response;
use crate::state::AppState;
use crate::stores::product::{NewProduct, ProductStore};

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<CreateProductResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    if payload.title.trim().is_empty() {
        return Err(error_response(&AppError::InvalidInput(
            "title is required".to_string(),
        )));
    }

    let commission = CommissionSpec::resolve(
        payload.commission_type,
        payload.commission_rate,
        payload.flat_commission_cents,
    )
    .map_err(|err| error_response(&err))?;

    let breakdown = quote(payload.seller_ask_cents, &commission, &state.fees)
        .map_err(|err| error_response(&err))?;

    let store = ProductStore::new(state.db_pool.clone());
    let product_id = store
        .create(NewProduct {
            title: payload.title,
            description: payload.description,
            breakdown,
        })
        .await
        .map_err(|err| error_response(&err))?;

    Ok(Json(CreateProductResponse {
        product_id,
        breakdown,
    }))
}

/// Load a product back into the form. Persisted pricing facts are trusted
/// verbatim; only when the stored fee fields are gone does the reconciler
/// rebuild them, and the response flags how trustworthy the result is.
pub async fn load_for_edit(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ProductEditResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let product_id = Uuid::parse_str(&product_id).map_err(|_| {
        error_response(&AppError::InvalidInput("invalid product id".to_string()))
    })?;

    let store = ProductStore::new(state.db_pool.clone());
    let record = store
        .get(product_id)
        .await
        .map_err(|err| error_response(&err))?
        .ok_or_else(|| error_response(&AppError::NotFound))?;

    let reconciled = reconcile(&record.stored, None, &state.fees);

    Ok(Json(ProductEditResponse {
        product_id: record.product_id,
        title: record.title,
        description: record.description,
        breakdown: reconciled.breakdown,
        breakdown_source: reconciled.source,
    }))
}

#[cfg(test)]
mod tests {
    use apiary_common::pricing::FeeSchedule;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;

    async fn test_app() -> axum::Router {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrate");

        let state = AppState::new("boot-test".to_string(), None, pool, FeeSchedule::default());
        build_router(state)
    }

    #[tokio::test]
    async fn create_then_edit_preserves_the_persisted_cents() {
        let app = test_app().await;

        let payload = json!({
            "title": "Beeswax candle set",
            "description": "Hand poured",
            "seller_ask_cents": 20_000,
            "commission_type": "percentage",
            "commission_rate": 25.0
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/products")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("create response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let created: Value = serde_json::from_slice(&body).expect("json");
        let product_id = created["product_id"].as_str().expect("product_id");
        assert_eq!(created["breakdown"]["listing_price_cents"], 28_391);

        let edit_response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/products/{product_id}/edit"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("edit response");
        assert_eq!(edit_response.status(), StatusCode::OK);
        let edit_body = axum::body::to_bytes(edit_response.into_body(), usize::MAX)
            .await
            .expect("body");
        let edited: Value = serde_json::from_slice(&edit_body).expect("json");

        assert_eq!(edited["breakdown_source"], "persisted");
        assert_eq!(edited["breakdown"]["seller_cents"], 20_000);
        assert_eq!(edited["breakdown"]["affiliate_cents"], 5_000);
        assert_eq!(edited["breakdown"]["stripe_fee_cents"], 810);
        assert_eq!(edited["breakdown"]["platform_fee_cents"], 2_581);
        assert_eq!(edited["breakdown"]["listing_price_cents"], 28_391);
    }

    #[tokio::test]
    async fn create_rejects_an_empty_title() {
        let app = test_app().await;

        let payload = json!({
            "title": "  ",
            "seller_ask_cents": 10_000,
            "commission_type": "percentage",
            "commission_rate": 20.0
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/products")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn edit_of_unknown_product_is_404() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/api/v1/products/{}/edit",
                        uuid::Uuid::new_v4()
                    ))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
