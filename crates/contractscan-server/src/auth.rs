use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::warn;

use contractscan_db::Database;
use contractscan_service::DEFAULT_USER;

use crate::routes::AppState;

/// Enabled when an env key is set or the database holds at least one key.
pub struct AuthConfig {
    /// Digest of `CONTRACTSCAN_API_KEY`; that key acts as the default user.
    pub env_key_hash: Option<String>,
    pub db: Arc<dyn Database>,
}

/// The user a request acts for. Inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub fn default_user() -> Self {
        Principal(DEFAULT_USER.to_string())
    }
}

const KEY_PREFIX: &str = "cs_";
const KEY_SUFFIX_LEN: usize = 43;

/// Hex-encoded SHA-256 digest. Only digests of API keys are ever stored.
pub fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

/// Fresh API key: `cs_` followed by 43 random alphanumeric characters.
pub fn generate_api_key() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{KEY_PREFIX}{suffix}")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid API key" })),
    )
        .into_response()
}

/// Resolve a bearer token to the user it belongs to.
async fn authenticate(auth: &AuthConfig, token: &str) -> Option<Principal> {
    let token_hash = sha256_hex(token);
    let env_match = auth
        .env_key_hash
        .as_deref()
        .is_some_and(|env_hash| constant_time_eq(&token_hash, env_hash));
    if env_match {
        return Some(Principal::default_user());
    }

    match auth.db.find_api_key_by_hash(&token_hash).await {
        Ok(Some(api_key)) => {
            let db = auth.db.clone();
            let key_id = api_key.id.clone();
            tokio::spawn(async move {
                if let Err(e) = db.touch_api_key(&key_id).await {
                    warn!("touch api key {key_id}: {e}");
                }
            });
            Some(Principal(api_key.user_id))
        }
        Ok(None) => None,
        Err(e) => {
            warn!("api key lookup failed: {e}");
            None
        }
    }
}

/// Axum middleware that enforces authentication and attaches a [`Principal`].
///
/// If `auth` is `None` in the AppState, every request passes through as the
/// default user. Otherwise a valid `Authorization: Bearer <token>` header is
/// required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(auth) = state.auth.as_ref() else {
        request.extensions_mut().insert(Principal::default_user());
        return next.run(request).await;
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return unauthorized();
    };

    match authenticate(auth, token).await {
        Some(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        None => unauthorized(),
    }
}

/// Compares every byte regardless of where the first mismatch is.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// `None` means open access: no `CONTRACTSCAN_API_KEY` and an empty key table.
pub async fn build_auth_config(db: Arc<dyn Database>) -> Option<Arc<AuthConfig>> {
    let env_key = std::env::var("CONTRACTSCAN_API_KEY").ok();
    build_auth_config_with_key(db, env_key.as_deref()).await
}

pub async fn build_auth_config_with_key(
    db: Arc<dyn Database>,
    env_key: Option<&str>,
) -> Option<Arc<AuthConfig>> {
    let env_key_hash = env_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(sha256_hex);

    let has_db_keys = match db.has_api_keys().await {
        Ok(has) => has,
        Err(e) => {
            warn!("could not check for api keys: {e}");
            false
        }
    };

    (env_key_hash.is_some() || has_db_keys).then(|| Arc::new(AuthConfig { env_key_hash, db }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::test_helpers::{body_json, test_router, test_router_with_auth, test_router_with_db_key};

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn generate_api_key_format() {
        let key = generate_api_key();
        let suffix = key.strip_prefix("cs_").unwrap();
        assert_eq!(suffix.len(), 43);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn constant_time_eq_cases() {
        let digest = sha256_hex("k1");
        assert!(constant_time_eq(&digest, &sha256_hex("k1")));
        assert!(!constant_time_eq(&digest, &sha256_hex("k2")));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }

    #[tokio::test]
    async fn build_auth_config_no_keys() {
        let db = Arc::new(contractscan_db::SqliteDatabase::open_in_memory().unwrap());
        assert!(build_auth_config_with_key(db.clone(), None).await.is_none());
        assert!(build_auth_config_with_key(db, Some("  ")).await.is_none());
    }

    #[tokio::test]
    async fn build_auth_config_env_or_db_key() {
        let db = Arc::new(contractscan_db::SqliteDatabase::open_in_memory().unwrap());
        let config = build_auth_config_with_key(db.clone(), Some("secret")).await.unwrap();
        assert_eq!(config.env_key_hash, Some(sha256_hex("secret")));

        db.insert_api_key("ci", "alice", &sha256_hex("k")).await.unwrap();
        let config = build_auth_config_with_key(db, None).await.unwrap();
        assert!(config.env_key_hash.is_none());
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn open_access_acts_as_default_user() {
        let app = test_router().await;
        let resp = app.oneshot(get("/api/user/preferences", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["user_id"], "default");
    }

    #[tokio::test]
    async fn env_key_acts_as_default_user() {
        let (app, api_key) = test_router_with_auth().await;
        let resp = app
            .oneshot(get("/api/user/preferences", Some(&api_key)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["user_id"], "default");
    }

    #[tokio::test]
    async fn db_key_acts_as_its_owner() {
        let (app, api_key) = test_router_with_db_key("alice").await;
        let resp = app
            .oneshot(get("/api/user/preferences", Some(&api_key)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["user_id"], "alice");
    }

    #[tokio::test]
    async fn invalid_or_missing_bearer_rejected() {
        let (app, _api_key) = test_router_with_auth().await;
        let resp = app
            .clone()
            .oneshot(get("/api/contracts", Some("wrong-key")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"], "missing or invalid API key");

        let resp = app.oneshot(get("/api/contracts", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_needs_no_auth() {
        let (app, _api_key) = test_router_with_auth().await;
        let resp = app.oneshot(get("/api/health", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
