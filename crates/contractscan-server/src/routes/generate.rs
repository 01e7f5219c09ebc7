use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use contractscan_core::ContractRequirements;
use contractscan_service::ContractService;
use serde_json::{json, Value};

use super::{json_body, to_error, ApiError, AppState};
use crate::auth::Principal;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/contracts/generate", post(generate_contract))
}

async fn generate_contract(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ContractRequirements>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = json_body(payload)?;
    state
        .service_for(&principal)
        .generate_contract(&input)
        .await
        .map(|g| (StatusCode::CREATED, Json(json!(g))))
        .map_err(to_error)
}
