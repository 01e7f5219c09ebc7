use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::UserPreferences;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_preferences(row: &Row) -> rusqlite::Result<UserPreferences> {
    Ok(UserPreferences {
        user_id: row.get("user_id")?,
        industry: row.get("industry")?,
        region: row.get("region")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    /// Stored preferences, or the defaults when the user never saved any.
    pub fn get_preferences_sync(&self, user_id: &str) -> Result<UserPreferences, DbError> {
        self.with_conn(|conn| {
            let stored = conn
                .query_row(
                    "SELECT * FROM user_preferences WHERE user_id = ?1",
                    params![user_id],
                    row_to_preferences,
                )
                .optional()
                .to_db()?;
            Ok(stored.unwrap_or_else(|| UserPreferences::defaults_for(user_id)))
        })
    }

    pub fn upsert_preferences_sync(
        &self,
        user_id: &str,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, DbError> {
        let mut prefs = self.get_preferences_sync(user_id)?;
        if let Some(ref industry) = update.industry {
            prefs.industry = industry.clone();
        }
        if let Some(ref region) = update.region {
            prefs.region = region.clone();
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_preferences (user_id, industry, region, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                    industry = excluded.industry,
                    region = excluded.region,
                    updated_at = excluded.updated_at",
                params![user_id, prefs.industry, prefs.region, Utc::now()],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM user_preferences WHERE user_id = ?1",
                params![user_id],
                row_to_preferences,
            )
            .to_db()
        })
    }
}
