pub mod auth;
pub mod config;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use contractscan_ai::{Analyzer, OpenAiBackend};
use contractscan_db::Database;
use contractscan_service::LocalService;
use tokio::net::TcpListener;
use tracing::{info, warn};

use auth::AuthConfig;
use config::ServerConfig;

pub use routes::build_router;

/// Open the configured database and model backend.
pub async fn build_service(config: &ServerConfig) -> Result<(LocalService, Arc<dyn Database>)> {
    let db = contractscan_db::open(&config.db_config()).await?;
    let backend = OpenAiBackend::new(config.model_config())?;
    if backend.is_configured() {
        info!("model: {} via {}", config.model, config.openai_base_url);
    } else {
        warn!("OPENAI_API_KEY is not set; analysis requests will return 503");
    }
    let analyzer = Analyzer::new(Arc::new(backend), config.max_tokens);
    Ok((LocalService::new(db.clone(), analyzer), db))
}

pub async fn serve(
    listener: TcpListener,
    service: LocalService,
    auth: Option<Arc<AuthConfig>>,
) -> Result<()> {
    let app = routes::build_router(service, auth);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
