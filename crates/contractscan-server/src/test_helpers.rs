use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use contractscan_ai::{Analyzer, MockBackend, ModelConfig, OpenAiBackend};
use contractscan_db::{Database, SqliteDatabase};
use contractscan_service::LocalService;
use tokio::net::TcpListener;

use crate::auth::{build_auth_config_with_key, generate_api_key, sha256_hex, AuthConfig};

/// Model reply used by [`test_router`]: one HIGH payment issue.
pub const SAMPLE_ANALYSIS: &str = r#"{
  "riskLevel": "HIGH",
  "type": "SERVICE",
  "recommendedActions": ["Negotiate net 30 payment terms"],
  "complianceFlags": [],
  "issues": [{
    "type": "PAYMENT",
    "text": "Payment within 90 days",
    "explanation": "A 90 day payment window strains cash flow.",
    "suggestion": "Payment within 30 days of invoice.",
    "severity": "HIGH",
    "severityScore": 8,
    "industryRelevance": ["general"]
  }]
}"#;

pub const SAMPLE_COMPARISON: &str = r#"{
  "differences": {
    "added": ["Kill fee of 25%"],
    "removed": [],
    "modified": [{"original": "Net 90", "revised": "Net 30", "explanation": "Faster payment"}]
  },
  "summary": "The revised contract pays faster and adds a kill fee.",
  "riskAssessment": {
    "originalRisk": "HIGH",
    "revisedRisk": "LOW",
    "improvements": ["Shorter payment window"],
    "concerns": []
  }
}"#;

fn memory_db() -> Arc<SqliteDatabase> {
    Arc::new(SqliteDatabase::open_in_memory().unwrap())
}

fn service(db: Arc<dyn Database>, mock: Arc<MockBackend>) -> LocalService {
    LocalService::new(db, Analyzer::new(mock, 2000))
}

/// Build a test router with in-memory SQLite, a mock model answering
/// [`SAMPLE_ANALYSIS`], and no auth.
pub async fn test_router() -> Router {
    test_router_with(Arc::new(MockBackend::success(SAMPLE_ANALYSIS))).await
}

/// Build a test router around a caller-supplied mock backend, no auth.
pub async fn test_router_with(mock: Arc<MockBackend>) -> Router {
    crate::routes::build_router(service(memory_db(), mock), None)
}

/// Build a test router whose model backend has no API key.
pub async fn test_router_unconfigured() -> Router {
    let backend = OpenAiBackend::new(ModelConfig::default()).unwrap();
    let analyzer = Analyzer::new(Arc::new(backend), 2000);
    crate::routes::build_router(LocalService::new(memory_db(), analyzer), None)
}

/// Build a test router with an env-style key enabled, returning (router, api_key).
pub async fn test_router_with_auth() -> (Router, String) {
    let db = memory_db();
    let api_key = generate_api_key();
    let auth = Arc::new(AuthConfig {
        env_key_hash: Some(sha256_hex(&api_key)),
        db: db.clone(),
    });
    let mock = Arc::new(MockBackend::success(SAMPLE_ANALYSIS));
    let router = crate::routes::build_router(service(db, mock), Some(auth));
    (router, api_key)
}

/// Build a test router with one DB-backed key owned by `user_id`.
pub async fn test_router_with_db_key(user_id: &str) -> (Router, String) {
    let db = memory_db();
    let api_key = generate_api_key();
    db.insert_api_key("test", user_id, &sha256_hex(&api_key))
        .await
        .unwrap();
    let auth = build_auth_config_with_key(db.clone(), None).await;
    let mock = Arc::new(MockBackend::success(SAMPLE_ANALYSIS));
    let router = crate::routes::build_router(service(db, mock), auth);
    (router, api_key)
}

/// Collect a response body as JSON.
pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    spawn_router(test_router().await).await
}

pub async fn spawn_test_server_with(mock: Arc<MockBackend>) -> TestServer {
    spawn_router(test_router_with(mock).await).await
}

pub async fn spawn_test_server_with_auth() -> (TestServer, String) {
    let (router, key) = test_router_with_auth().await;
    (spawn_router(router).await, key)
}

async fn spawn_router(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
