use apiary_common::api::HealthResponse;
use axum::extract::State;
use axum::Json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        boot_id: Some(state.boot_id.clone()),
        git_sha: state.git_sha.clone(),
    })
}
