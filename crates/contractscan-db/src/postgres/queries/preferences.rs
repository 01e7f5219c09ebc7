use chrono::{DateTime, Utc};

use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::UserPreferences;

use super::super::{pg_err, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct PreferencesRow {
    user_id: String,
    industry: String,
    region: String,
    updated_at: DateTime<Utc>,
}

impl From<PreferencesRow> for UserPreferences {
    fn from(r: PreferencesRow) -> Self {
        UserPreferences {
            user_id: r.user_id,
            industry: r.industry,
            region: r.region,
            updated_at: Some(r.updated_at),
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_get_preferences(&self, user_id: &str) -> Result<UserPreferences, DbError> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            "SELECT * FROM user_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?;
        Ok(row
            .map(UserPreferences::from)
            .unwrap_or_else(|| UserPreferences::defaults_for(user_id)))
    }

    pub(crate) async fn pg_upsert_preferences(
        &self,
        user_id: &str,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, DbError> {
        let mut prefs = self.pg_get_preferences(user_id).await?;
        if let Some(ref industry) = update.industry {
            prefs.industry = industry.clone();
        }
        if let Some(ref region) = update.region {
            prefs.region = region.clone();
        }

        let row = sqlx::query_as::<_, PreferencesRow>(
            "INSERT INTO user_preferences (user_id, industry, region, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                industry = EXCLUDED.industry,
                region = EXCLUDED.region,
                updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(user_id)
        .bind(&prefs.industry)
        .bind(&prefs.region)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;
        Ok(row.into())
    }
}
