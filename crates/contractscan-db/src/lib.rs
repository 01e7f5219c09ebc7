#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use contractscan_core::api_key::ApiKey;
use contractscan_core::comparison::NewComparison;
use contractscan_core::contract::{ContractFilter, ContractStats, NewContract};
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{Comparison, Contract, UserPreferences};

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Internal(format!("json column: {e}"))
    }
}

/// Where to store data. A Postgres URL wins over the SQLite path.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    pub database_url: Option<String>,
    pub sqlite_path: Option<String>,
}

/// Default data directory: `$XDG_DATA_HOME/contractscan`, falling back to
/// `~/.local/share/contractscan`.
pub fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("contractscan")
}

/// Open whichever backend `config` points at.
pub async fn open(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    if let Some(url) = config.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
        return open_url(url).await;
    }
    open_sqlite(config)
}

#[cfg(feature = "postgres")]
async fn open_url(url: &str) -> Result<Arc<dyn Database>, DbError> {
    tracing::info!("using postgres backend");
    Ok(Arc::new(PostgresDatabase::connect(url).await?))
}

#[cfg(not(feature = "postgres"))]
async fn open_url(_url: &str) -> Result<Arc<dyn Database>, DbError> {
    Err(DbError::Internal(
        "DATABASE_URL is set but this build has no postgres support (enable the `postgres` feature)".into(),
    ))
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    Ok(Arc::new(SqliteDatabase::open(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    Err(DbError::Internal("no database backend enabled".into()))
}

/// Storage for contracts, comparisons, preferences and API keys.
///
/// Every per-user lookup takes the owning `user_id`; rows owned by someone
/// else are reported as `NotFound`.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Contracts --
    async fn create_contract(&self, input: &NewContract) -> Result<Contract, DbError>;
    async fn get_contract(&self, user_id: &str, id: &str) -> Result<Contract, DbError>;
    async fn list_contracts(
        &self,
        user_id: &str,
        filter: &ContractFilter,
    ) -> Result<Vec<Contract>, DbError>;
    async fn delete_contract(&self, user_id: &str, id: &str) -> Result<(), DbError>;
    async fn contract_stats(&self, user_id: &str) -> Result<ContractStats, DbError>;

    // -- Comparisons --
    async fn create_comparison(&self, input: &NewComparison) -> Result<Comparison, DbError>;
    async fn get_comparison(&self, user_id: &str, id: &str) -> Result<Comparison, DbError>;
    async fn list_comparisons(&self, user_id: &str) -> Result<Vec<Comparison>, DbError>;

    // -- Preferences --
    async fn get_preferences(&self, user_id: &str) -> Result<UserPreferences, DbError>;
    async fn upsert_preferences(
        &self,
        user_id: &str,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, DbError>;

    // -- API Keys --
    async fn insert_api_key(
        &self,
        name: &str,
        user_id: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError>;
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError>;
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError>;
    async fn has_api_keys(&self) -> Result<bool, DbError>;
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError>;
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError>;
}
