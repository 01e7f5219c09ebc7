use chrono::Utc;
use rusqlite::{params, Row};

use contractscan_core::comparison::NewComparison;
use contractscan_core::Comparison;

use super::super::{json_col, not_found_or, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_comparison(row: &Row) -> rusqlite::Result<Comparison> {
    Ok(Comparison {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        original_contract_id: row.get("original_contract_id")?,
        revised_contract_id: row.get("revised_contract_id")?,
        differences: json_col(row, "differences")?,
        summary: row.get("summary")?,
        created_at: row.get("created_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_comparison_sync(&self, input: &NewComparison) -> Result<Comparison, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO comparisons (
                    id, user_id, original_contract_id, revised_contract_id, differences, summary, created_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    input.user_id,
                    input.original_contract_id,
                    input.revised_contract_id,
                    serde_json::to_string(&input.differences)?,
                    input.summary,
                    Utc::now(),
                ],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM comparisons WHERE id = ?1",
                params![id],
                row_to_comparison,
            )
            .to_db()
        })
    }

    pub fn get_comparison_sync(&self, user_id: &str, id: &str) -> Result<Comparison, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM comparisons WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                row_to_comparison,
            )
            .map_err(not_found_or(format!("comparison {id}")))
        })
    }

    pub fn list_comparisons_sync(&self, user_id: &str) -> Result<Vec<Comparison>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM comparisons WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC",
                )
                .to_db()?;
            let rows = stmt
                .query_map(params![user_id], row_to_comparison)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(rows)
        })
    }
}
