use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Args;
use contractscan_ai::config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use contractscan_ai::ModelConfig;
use contractscan_db::DbConfig;

pub const DEFAULT_PORT: u16 = 3720;

/// Server settings. Every flag can also come from the environment.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "CONTRACTSCAN_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "CONTRACTSCAN_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Postgres connection URL; when unset the SQLite file is used
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Path of the SQLite database file
    #[arg(long, env = "CONTRACTSCAN_DB_PATH")]
    pub db_path: Option<String>,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Model name sent with every completion request
    #[arg(long, env = "CONTRACTSCAN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Completion token limit
    #[arg(long, env = "CONTRACTSCAN_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Model request timeout (seconds)
    #[arg(long, env = "CONTRACTSCAN_REQUEST_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub request_timeout: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {:?}: {e}", self.bind))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            sqlite_path: self.db_path.clone(),
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.request_timeout),
        }
    }
}
