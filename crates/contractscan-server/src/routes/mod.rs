pub mod comparisons;
pub mod contracts;
pub mod generate;
pub mod health;
pub mod preferences;

use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    middleware, Json, Router,
};
use contractscan_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::auth::{auth_middleware, AuthConfig, Principal};

pub struct InnerAppState {
    pub service: LocalService,
    pub auth: Option<Arc<AuthConfig>>,
}

impl InnerAppState {
    /// The service scoped to the authenticated user.
    pub fn service_for(&self, principal: &Principal) -> LocalService {
        self.service.for_user(&principal.0)
    }
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);

pub fn build_router(service: LocalService, auth: Option<Arc<AuthConfig>>) -> Router {
    let state: AppState = Arc::new(InnerAppState { service, auth });

    let public = Router::new().merge(health::routes());

    let protected = Router::new()
        .merge(contracts::routes())
        .merge(comparisons::routes())
        .merge(generate::routes())
        .merge(preferences::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public.merge(protected).layer(cors).with_state(state)
}

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("{e}");
    }
    (status, Json(json!({ "error": e.to_string() })))
}

/// Unwrap a JSON body, reporting a bad body as 400 in the usual error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| to_error(ServiceError::InvalidInput(e.body_text())))
}

pub(crate) fn query_params<T>(
    query: Result<axum::extract::Query<T>, QueryRejection>,
) -> Result<T, ApiError> {
    query
        .map(|axum::extract::Query(q)| q)
        .map_err(|e| to_error(ServiceError::InvalidInput(e.body_text())))
}
