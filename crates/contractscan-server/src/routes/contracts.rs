use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use contractscan_core::contract::{AnalyzeContract, ContractFilter};
use contractscan_core::{ContractSource, Severity};
use contractscan_service::{ContractService, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{json_body, query_params, to_error, ApiError, AppState};
use crate::auth::Principal;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contracts", get(list_contracts))
        .route("/api/contracts/analyze", post(analyze_contract))
        .route("/api/contracts/stats", get(contract_stats))
        .route(
            "/api/contracts/{id}",
            get(get_contract).delete(delete_contract),
        )
}

#[derive(Debug, Deserialize)]
struct ContractQuery {
    risk: Option<String>,
    source: Option<String>,
    limit: Option<i64>,
}

impl ContractQuery {
    fn into_filter(self) -> Result<ContractFilter, ServiceError> {
        let risk_level = match self.risk.as_deref().filter(|r| !r.is_empty()) {
            Some(r) => Some(
                Severity::parse_str(r)
                    .ok_or_else(|| ServiceError::InvalidInput(format!("unknown risk level: {r}")))?,
            ),
            None => None,
        };
        let source = match self.source.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => Some(
                ContractSource::parse_str(&s.to_ascii_lowercase())
                    .ok_or_else(|| ServiceError::InvalidInput(format!("unknown source: {s}")))?,
            ),
            None => None,
        };
        Ok(ContractFilter {
            risk_level,
            source,
            limit: self.limit,
        })
    }
}

async fn list_contracts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<ContractQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let filter = query_params(query)?.into_filter().map_err(to_error)?;
    state
        .service_for(&principal)
        .list_contracts(&filter)
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}

async fn analyze_contract(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<AnalyzeContract>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = json_body(payload)?;
    state
        .service_for(&principal)
        .analyze_contract(&input)
        .await
        .map(|c| (StatusCode::CREATED, Json(json!(c))))
        .map_err(to_error)
}

async fn contract_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(&principal)
        .contract_stats()
        .await
        .map(|s| Json(json!(s)))
        .map_err(to_error)
}

async fn get_contract(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(&principal)
        .get_contract(&id)
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}

async fn delete_contract(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service_for(&principal)
        .delete_contract(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}
