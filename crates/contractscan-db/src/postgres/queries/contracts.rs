use chrono::{DateTime, Utc};

use contractscan_core::contract::{ContractFilter, ContractStats, NewContract};
use contractscan_core::{Contract, ContractIssue, ContractSource, ContractType, IssueType, Severity};

use super::super::{pg_err, pg_json, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct ContractRow {
    id: String,
    user_id: String,
    title: String,
    original_text: String,
    source: String,
    risk_level: Option<String>,
    contract_type: String,
    recommended_actions: String,
    compliance_flags: String,
    metadata: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContractRow {
    fn into_contract(self, issues: Vec<ContractIssue>) -> Result<Contract, DbError> {
        Ok(Contract {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            original_text: self.original_text,
            source: ContractSource::parse_str(&self.source).unwrap_or(ContractSource::Analyzed),
            risk_level: self.risk_level.and_then(|s| Severity::parse_str(&s)),
            contract_type: ContractType::parse_str(&self.contract_type).unwrap_or(ContractType::Other),
            recommended_actions: pg_json(&self.recommended_actions)?,
            compliance_flags: pg_json(&self.compliance_flags)?,
            issues,
            metadata: pg_json(&self.metadata)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct IssueRow {
    category: String,
    label: String,
    text: String,
    explanation: String,
    suggestion: String,
    severity: String,
    severity_score: i32,
    industry_relevance: String,
    metadata: String,
}

impl TryFrom<IssueRow> for ContractIssue {
    type Error = DbError;

    fn try_from(r: IssueRow) -> Result<Self, DbError> {
        Ok(ContractIssue {
            category: IssueType::parse_str(&r.category).unwrap_or(IssueType::Other),
            label: r.label,
            text: r.text,
            explanation: r.explanation,
            suggestion: r.suggestion,
            severity: Severity::parse_str(&r.severity).unwrap_or(Severity::Medium),
            severity_score: r.severity_score.clamp(1, 10) as u8,
            industry_relevance: pg_json(&r.industry_relevance)?,
            metadata: pg_json(&r.metadata)?,
        })
    }
}

impl PostgresDatabase {
    async fn pg_load_issues(&self, contract_id: &str) -> Result<Vec<ContractIssue>, DbError> {
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT * FROM contract_issues WHERE contract_id = $1 ORDER BY position ASC",
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;
        rows.into_iter().map(ContractIssue::try_from).collect()
    }

    pub(crate) async fn pg_create_contract(&self, input: &NewContract) -> Result<Contract, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(pg_err)?;

        sqlx::query(
            "INSERT INTO contracts (
                id, user_id, title, original_text, source, risk_level, contract_type,
                recommended_actions, compliance_flags, metadata, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&id)
        .bind(&input.user_id)
        .bind(&input.title)
        .bind(&input.original_text)
        .bind(input.source.as_str())
        .bind(input.risk_level.map(|r| r.as_str()))
        .bind(input.contract_type.as_str())
        .bind(serde_json::to_string(&input.recommended_actions)?)
        .bind(serde_json::to_string(&input.compliance_flags)?)
        .bind(serde_json::to_string(&input.metadata)?)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(pg_err)?;

        for (position, issue) in input.issues.iter().enumerate() {
            sqlx::query(
                "INSERT INTO contract_issues (
                    id, contract_id, position, category, label, text, explanation,
                    suggestion, severity, severity_score, industry_relevance, metadata
                 )
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&id)
            .bind(position as i32)
            .bind(issue.category.as_str())
            .bind(&issue.label)
            .bind(&issue.text)
            .bind(&issue.explanation)
            .bind(&issue.suggestion)
            .bind(issue.severity.as_str())
            .bind(i32::from(issue.severity_score.clamp(1, 10)))
            .bind(serde_json::to_string(&issue.industry_relevance)?)
            .bind(serde_json::to_string(&issue.metadata)?)
            .execute(&mut *tx)
            .await
            .map_err(pg_err)?;
        }

        tx.commit().await.map_err(pg_err)?;
        self.pg_get_contract(&input.user_id, &id).await
    }

    pub(crate) async fn pg_get_contract(&self, user_id: &str, id: &str) -> Result<Contract, DbError> {
        let row = sqlx::query_as::<_, ContractRow>(
            "SELECT * FROM contracts WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?
        .ok_or_else(|| pg_not_found(&format!("contract {id}")))?;
        let issues = self.pg_load_issues(id).await?;
        row.into_contract(issues)
    }

    pub(crate) async fn pg_list_contracts(
        &self,
        user_id: &str,
        filter: &ContractFilter,
    ) -> Result<Vec<Contract>, DbError> {
        let mut sql = String::from("SELECT * FROM contracts WHERE user_id = $1");
        let mut params: Vec<String> = Vec::new();
        let mut param_idx = 2usize;

        if let Some(risk) = filter.risk_level {
            sql.push_str(&format!(" AND risk_level = ${param_idx}"));
            params.push(risk.as_str().to_string());
            param_idx += 1;
        }
        if let Some(source) = filter.source {
            sql.push_str(&format!(" AND source = ${param_idx}"));
            params.push(source.as_str().to_string());
            param_idx += 1;
        }

        sql.push_str(" ORDER BY created_at DESC, seq DESC");

        if filter.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${param_idx}"));
        }

        let mut query = sqlx::query_as::<_, ContractRow>(&sql).bind(user_id);
        for p in &params {
            query = query.bind(p);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(pg_err)?;
        let mut contracts = Vec::with_capacity(rows.len());
        for row in rows {
            let issues = self.pg_load_issues(&row.id).await?;
            contracts.push(row.into_contract(issues)?);
        }
        Ok(contracts)
    }

    pub(crate) async fn pg_delete_contract(&self, user_id: &str, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            return Err(pg_not_found(&format!("contract {id}")));
        }
        Ok(())
    }

    pub(crate) async fn pg_contract_stats(&self, user_id: &str) -> Result<ContractStats, DbError> {
        let total_contracts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(pg_err)?;
        let total_issues: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contract_issues i
             JOIN contracts c ON c.id = i.contract_id
             WHERE c.user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT risk_level, COUNT(*) FROM contracts
             WHERE user_id = $1 AND risk_level IS NOT NULL
             GROUP BY risk_level",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;

        let mut stats = ContractStats {
            total_contracts,
            total_issues,
            ..ContractStats::default()
        };
        for (level, count) in rows {
            if let Some(level) = Severity::parse_str(&level) {
                stats.record(level, count);
            }
        }
        Ok(stats)
    }
}
