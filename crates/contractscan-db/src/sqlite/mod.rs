pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use contractscan_core::api_key::ApiKey;
use contractscan_core::comparison::NewComparison;
use contractscan_core::contract::{ContractFilter, ContractStats, NewContract};
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{Comparison, Contract, UserPreferences};

use crate::{Database, DbConfig, DbError};

/// Converts `rusqlite::Result<T>` into `Result<T, DbError>` via `.to_db()?`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("contractscan.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, DbError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.with_conn(migrations::run)?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }
}

pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Like `map_sqlite_err`, but an empty result becomes `NotFound(what)`.
pub(crate) fn not_found_or(what: String) -> impl FnOnce(rusqlite::Error) -> DbError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(what),
        other => map_sqlite_err(other),
    }
}

/// Read a TEXT column holding JSON.
pub(crate) fn json_col<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    name: &str,
) -> rusqlite::Result<T> {
    let raw: String = row.get(name)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_runs_migrations() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let version: i64 = conn
                .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
                .to_db()?;
            assert_eq!(version, migrations::LATEST);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn open_path_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("test.db");
        assert!(!db_path.exists());

        let _db = SqliteDatabase::open_path(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn reopen_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let config = DbConfig {
            sqlite_path: Some(tmp.path().join("nested/dir/cs.db").display().to_string()),
            ..DbConfig::default()
        };
        drop(SqliteDatabase::open(&config).unwrap());
        let db = SqliteDatabase::open(&config).unwrap();
        let rows: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
                    .to_db()
            })
            .unwrap();
        assert_eq!(rows, migrations::LATEST);
    }
}

impl SqliteDatabase {
    /// Run a synchronous query on tokio's blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DbError::Internal(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn create_contract(&self, input: &NewContract) -> Result<Contract, DbError> {
        let input = input.clone();
        self.blocking(move |db| db.create_contract_sync(&input)).await
    }

    async fn get_contract(&self, user_id: &str, id: &str) -> Result<Contract, DbError> {
        let (user_id, id) = (user_id.to_owned(), id.to_owned());
        self.blocking(move |db| db.get_contract_sync(&user_id, &id)).await
    }

    async fn list_contracts(
        &self,
        user_id: &str,
        filter: &ContractFilter,
    ) -> Result<Vec<Contract>, DbError> {
        let (user_id, filter) = (user_id.to_owned(), filter.clone());
        self.blocking(move |db| db.list_contracts_sync(&user_id, &filter)).await
    }

    async fn delete_contract(&self, user_id: &str, id: &str) -> Result<(), DbError> {
        let (user_id, id) = (user_id.to_owned(), id.to_owned());
        self.blocking(move |db| db.delete_contract_sync(&user_id, &id)).await
    }

    async fn contract_stats(&self, user_id: &str) -> Result<ContractStats, DbError> {
        let user_id = user_id.to_owned();
        self.blocking(move |db| db.contract_stats_sync(&user_id)).await
    }

    async fn create_comparison(&self, input: &NewComparison) -> Result<Comparison, DbError> {
        let input = input.clone();
        self.blocking(move |db| db.create_comparison_sync(&input)).await
    }

    async fn get_comparison(&self, user_id: &str, id: &str) -> Result<Comparison, DbError> {
        let (user_id, id) = (user_id.to_owned(), id.to_owned());
        self.blocking(move |db| db.get_comparison_sync(&user_id, &id)).await
    }

    async fn list_comparisons(&self, user_id: &str) -> Result<Vec<Comparison>, DbError> {
        let user_id = user_id.to_owned();
        self.blocking(move |db| db.list_comparisons_sync(&user_id)).await
    }

    async fn get_preferences(&self, user_id: &str) -> Result<UserPreferences, DbError> {
        let user_id = user_id.to_owned();
        self.blocking(move |db| db.get_preferences_sync(&user_id)).await
    }

    async fn upsert_preferences(
        &self,
        user_id: &str,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, DbError> {
        let (user_id, update) = (user_id.to_owned(), update.clone());
        self.blocking(move |db| db.upsert_preferences_sync(&user_id, &update)).await
    }

    async fn insert_api_key(
        &self,
        name: &str,
        user_id: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        let (name, user_id, key_hash) = (name.to_owned(), user_id.to_owned(), key_hash.to_owned());
        self.blocking(move |db| db.insert_api_key_sync(&name, &user_id, &key_hash))
            .await
    }

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        let key_hash = key_hash.to_owned();
        self.blocking(move |db| db.find_api_key_by_hash_sync(&key_hash)).await
    }

    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_owned();
        self.blocking(move |db| db.touch_api_key_sync(&id)).await
    }

    async fn has_api_keys(&self) -> Result<bool, DbError> {
        self.blocking(|db| db.has_api_keys_sync()).await
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.blocking(|db| db.list_api_keys_sync()).await
    }

    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_owned();
        self.blocking(move |db| db.delete_api_key_sync(&id)).await
    }
}
