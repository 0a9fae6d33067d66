use apiary_common::api::{ApiErrorResponse, PricingPreviewRequest, PricingPreviewResponse};
use apiary_common::pricing::{quote, recommended_rates, CommissionSpec};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::routes::error_response;
use crate::state::AppState;

/// Live preview while a seller types. Pure and recomputed from scratch on
/// every call; the same request body always yields the same cents the
/// checkout write will later persist.
pub async fn preview(
    State(state): State<AppState>,
    Json(payload): Json<PricingPreviewRequest>,
) -> Result<Json<PricingPreviewResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let commission = CommissionSpec::resolve(
        payload.commission_type,
        payload.commission_rate,
        payload.flat_commission_cents,
    )
    .map_err(|err| error_response(&err))?;

    let breakdown = quote(payload.seller_ask_cents, &commission, &state.fees)
        .map_err(|err| error_response(&err))?;

    Ok(Json(PricingPreviewResponse {
        breakdown,
        recommended_rates: recommended_rates(payload.seller_ask_cents),
    }))
}
