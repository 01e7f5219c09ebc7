use chrono::{DateTime, Utc};

use contractscan_core::comparison::NewComparison;
use contractscan_core::Comparison;

use super::super::{pg_err, pg_json, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct ComparisonRow {
    id: String,
    user_id: String,
    original_contract_id: String,
    revised_contract_id: String,
    differences: String,
    summary: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ComparisonRow> for Comparison {
    type Error = DbError;

    fn try_from(r: ComparisonRow) -> Result<Self, DbError> {
        Ok(Comparison {
            id: r.id,
            user_id: r.user_id,
            original_contract_id: r.original_contract_id,
            revised_contract_id: r.revised_contract_id,
            differences: pg_json(&r.differences)?,
            summary: r.summary,
            created_at: r.created_at,
        })
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_create_comparison(
        &self,
        input: &NewComparison,
    ) -> Result<Comparison, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO comparisons (
                id, user_id, original_contract_id, revised_contract_id, differences, summary, created_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(&input.user_id)
        .bind(&input.original_contract_id)
        .bind(&input.revised_contract_id)
        .bind(serde_json::to_string(&input.differences)?)
        .bind(&input.summary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(pg_err)?;

        self.pg_get_comparison(&input.user_id, &id).await
    }

    pub(crate) async fn pg_get_comparison(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Comparison, DbError> {
        let row = sqlx::query_as::<_, ComparisonRow>(
            "SELECT * FROM comparisons WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?
        .ok_or_else(|| pg_not_found(&format!("comparison {id}")))?;
        row.try_into()
    }

    pub(crate) async fn pg_list_comparisons(&self, user_id: &str) -> Result<Vec<Comparison>, DbError> {
        let rows = sqlx::query_as::<_, ComparisonRow>(
            "SELECT * FROM comparisons WHERE user_id = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;
        rows.into_iter().map(Comparison::try_from).collect()
    }
}
