use chrono::Utc;
use rusqlite::{params, Connection, Row};

use contractscan_core::contract::{ContractFilter, ContractStats, NewContract};
use contractscan_core::{Contract, ContractIssue, ContractSource, ContractType, IssueType, Severity};

use super::super::{json_col, not_found_or, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_contract(row: &Row) -> rusqlite::Result<Contract> {
    let source_str: String = row.get("source")?;
    let risk_str: Option<String> = row.get("risk_level")?;
    let type_str: String = row.get("contract_type")?;
    Ok(Contract {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        original_text: row.get("original_text")?,
        source: ContractSource::parse_str(&source_str).unwrap_or(ContractSource::Analyzed),
        risk_level: risk_str.and_then(|s| Severity::parse_str(&s)),
        contract_type: ContractType::parse_str(&type_str).unwrap_or(ContractType::Other),
        recommended_actions: json_col(row, "recommended_actions")?,
        compliance_flags: json_col(row, "compliance_flags")?,
        issues: Vec::new(),
        metadata: json_col(row, "metadata")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_issue(row: &Row) -> rusqlite::Result<ContractIssue> {
    let category_str: String = row.get("category")?;
    let severity_str: String = row.get("severity")?;
    let score: i64 = row.get("severity_score")?;
    Ok(ContractIssue {
        category: IssueType::parse_str(&category_str).unwrap_or(IssueType::Other),
        label: row.get("label")?,
        text: row.get("text")?,
        explanation: row.get("explanation")?,
        suggestion: row.get("suggestion")?,
        severity: Severity::parse_str(&severity_str).unwrap_or(Severity::Medium),
        severity_score: score.clamp(1, 10) as u8,
        industry_relevance: json_col(row, "industry_relevance")?,
        metadata: json_col(row, "metadata")?,
    })
}

fn load_issues(conn: &Connection, contract_id: &str) -> Result<Vec<ContractIssue>, DbError> {
    let mut stmt = conn
        .prepare_cached("SELECT * FROM contract_issues WHERE contract_id = ?1 ORDER BY position ASC")
        .to_db()?;
    let issues = stmt
        .query_map(params![contract_id], row_to_issue)
        .to_db()?
        .collect::<Result<Vec<_>, _>>()
        .to_db()?;
    Ok(issues)
}

fn fetch_contract(conn: &Connection, user_id: &str, id: &str) -> Result<Contract, DbError> {
    let mut contract = conn
        .query_row(
            "SELECT * FROM contracts WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            row_to_contract,
        )
        .map_err(not_found_or(format!("contract {id}")))?;
    contract.issues = load_issues(conn, id)?;
    Ok(contract)
}

impl SqliteDatabase {
    pub fn create_contract_sync(&self, input: &NewContract) -> Result<Contract, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            let tx = conn.unchecked_transaction().to_db()?;

            tx.execute(
                "INSERT INTO contracts (
                    id, user_id, title, original_text, source, risk_level, contract_type,
                    recommended_actions, compliance_flags, metadata, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    id,
                    input.user_id,
                    input.title,
                    input.original_text,
                    input.source.as_str(),
                    input.risk_level.map(|r| r.as_str()),
                    input.contract_type.as_str(),
                    serde_json::to_string(&input.recommended_actions)?,
                    serde_json::to_string(&input.compliance_flags)?,
                    serde_json::to_string(&input.metadata)?,
                    now,
                    now,
                ],
            )
            .to_db()?;

            for (position, issue) in input.issues.iter().enumerate() {
                tx.execute(
                    "INSERT INTO contract_issues (
                        id, contract_id, position, category, label, text, explanation,
                        suggestion, severity, severity_score, industry_relevance, metadata
                     )
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        uuid::Uuid::new_v4().to_string(),
                        id,
                        position as i64,
                        issue.category.as_str(),
                        issue.label,
                        issue.text,
                        issue.explanation,
                        issue.suggestion,
                        issue.severity.as_str(),
                        i64::from(issue.severity_score.clamp(1, 10)),
                        serde_json::to_string(&issue.industry_relevance)?,
                        serde_json::to_string(&issue.metadata)?,
                    ],
                )
                .to_db()?;
            }

            tx.commit().to_db()?;
            fetch_contract(conn, &input.user_id, &id)
        })
    }

    pub fn get_contract_sync(&self, user_id: &str, id: &str) -> Result<Contract, DbError> {
        self.with_conn(|conn| fetch_contract(conn, user_id, id))
    }

    pub fn list_contracts_sync(
        &self,
        user_id: &str,
        filter: &ContractFilter,
    ) -> Result<Vec<Contract>, DbError> {
        self.with_conn(|conn| {
            let mut sql = String::from("SELECT * FROM contracts WHERE user_id = ?1");
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
                vec![Box::new(user_id.to_string())];

            if let Some(risk) = filter.risk_level {
                param_values.push(Box::new(risk.as_str().to_string()));
                sql.push_str(&format!(" AND risk_level = ?{}", param_values.len()));
            }
            if let Some(source) = filter.source {
                param_values.push(Box::new(source.as_str().to_string()));
                sql.push_str(&format!(" AND source = ?{}", param_values.len()));
            }

            sql.push_str(" ORDER BY created_at DESC, rowid DESC");

            if let Some(limit) = filter.limit {
                param_values.push(Box::new(limit));
                sql.push_str(&format!(" LIMIT ?{}", param_values.len()));
            }

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let mut stmt = conn.prepare(&sql).to_db()?;
            let mut contracts = stmt
                .query_map(params_ref.as_slice(), row_to_contract)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            for c in &mut contracts {
                c.issues = load_issues(conn, &c.id)?;
            }
            Ok(contracts)
        })
    }

    pub fn delete_contract_sync(&self, user_id: &str, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM contracts WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("contract {id}")));
            }
            Ok(())
        })
    }

    pub fn contract_stats_sync(&self, user_id: &str) -> Result<ContractStats, DbError> {
        self.with_conn(|conn| {
            let mut stats = ContractStats {
                total_contracts: conn
                    .query_row(
                        "SELECT COUNT(*) FROM contracts WHERE user_id = ?1",
                        params![user_id],
                        |row| row.get(0),
                    )
                    .to_db()?,
                total_issues: conn
                    .query_row(
                        "SELECT COUNT(*) FROM contract_issues i
                         JOIN contracts c ON c.id = i.contract_id
                         WHERE c.user_id = ?1",
                        params![user_id],
                        |row| row.get(0),
                    )
                    .to_db()?,
                ..ContractStats::default()
            };

            let mut stmt = conn
                .prepare(
                    "SELECT risk_level, COUNT(*) FROM contracts
                     WHERE user_id = ?1 AND risk_level IS NOT NULL
                     GROUP BY risk_level",
                )
                .to_db()?;
            let rows = stmt
                .query_map(params![user_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            for (level, count) in rows {
                if let Some(level) = Severity::parse_str(&level) {
                    stats.record(level, count);
                }
            }
            Ok(stats)
        })
    }
}
