pub(crate) mod migrations;
pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use contractscan_core::api_key::ApiKey;
use contractscan_core::comparison::NewComparison;
use contractscan_core::contract::{ContractFilter, ContractStats, NewContract};
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{Comparison, Contract, UserPreferences};

use crate::{Database, DbError};

pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

pub(crate) fn pg_not_found(entity: &str) -> DbError {
    DbError::NotFound(entity.to_string())
}

/// Parse a TEXT column holding JSON.
pub(crate) fn pg_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, DbError> {
    Ok(serde_json::from_str(raw)?)
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    // -- Contracts --
    async fn create_contract(&self, input: &NewContract) -> Result<Contract, DbError> {
        self.pg_create_contract(input).await
    }
    async fn get_contract(&self, user_id: &str, id: &str) -> Result<Contract, DbError> {
        self.pg_get_contract(user_id, id).await
    }
    async fn list_contracts(
        &self,
        user_id: &str,
        filter: &ContractFilter,
    ) -> Result<Vec<Contract>, DbError> {
        self.pg_list_contracts(user_id, filter).await
    }
    async fn delete_contract(&self, user_id: &str, id: &str) -> Result<(), DbError> {
        self.pg_delete_contract(user_id, id).await
    }
    async fn contract_stats(&self, user_id: &str) -> Result<ContractStats, DbError> {
        self.pg_contract_stats(user_id).await
    }

    // -- Comparisons --
    async fn create_comparison(&self, input: &NewComparison) -> Result<Comparison, DbError> {
        self.pg_create_comparison(input).await
    }
    async fn get_comparison(&self, user_id: &str, id: &str) -> Result<Comparison, DbError> {
        self.pg_get_comparison(user_id, id).await
    }
    async fn list_comparisons(&self, user_id: &str) -> Result<Vec<Comparison>, DbError> {
        self.pg_list_comparisons(user_id).await
    }

    // -- Preferences --
    async fn get_preferences(&self, user_id: &str) -> Result<UserPreferences, DbError> {
        self.pg_get_preferences(user_id).await
    }
    async fn upsert_preferences(
        &self,
        user_id: &str,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, DbError> {
        self.pg_upsert_preferences(user_id, update).await
    }

    // -- API Keys --
    async fn insert_api_key(
        &self,
        name: &str,
        user_id: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        self.pg_insert_api_key(name, user_id, key_hash).await
    }
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        self.pg_find_api_key_by_hash(key_hash).await
    }
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        self.pg_touch_api_key(id).await
    }
    async fn has_api_keys(&self) -> Result<bool, DbError> {
        self.pg_has_api_keys().await
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.pg_list_api_keys().await
    }
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        self.pg_delete_api_key(id).await
    }
}
