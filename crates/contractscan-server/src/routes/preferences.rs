use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Extension, Json, Router,
};
use contractscan_core::preferences::UpdatePreferences;
use contractscan_service::ContractService;
use serde_json::{json, Value};

use super::{json_body, to_error, ApiError, AppState};
use crate::auth::Principal;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/user/preferences",
        get(get_preferences).patch(update_preferences),
    )
}

async fn get_preferences(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(&principal)
        .get_preferences()
        .await
        .map(|p| Json(json!(p)))
        .map_err(to_error)
}

async fn update_preferences(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<UpdatePreferences>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let update = json_body(payload)?;
    state
        .service_for(&principal)
        .update_preferences(&update)
        .await
        .map(|p| Json(json!(p)))
        .map_err(to_error)
}
