use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use contractscan_core::comparison::CompareContracts;
use contractscan_service::ContractService;
use serde_json::{json, Value};

use super::{json_body, to_error, ApiError, AppState};
use crate::auth::Principal;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contracts/compare", post(compare_contracts))
        .route("/api/comparisons", get(list_comparisons))
        .route("/api/comparisons/{id}", get(get_comparison))
}

async fn compare_contracts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CompareContracts>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = json_body(payload)?;
    state
        .service_for(&principal)
        .compare_contracts(&input)
        .await
        .map(|outcome| (StatusCode::CREATED, Json(json!(outcome))))
        .map_err(to_error)
}

async fn list_comparisons(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(&principal)
        .list_comparisons()
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}

async fn get_comparison(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(&principal)
        .get_comparison(&id)
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}
