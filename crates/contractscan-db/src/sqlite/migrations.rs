use chrono::Utc;
use rusqlite::{params, Connection};

use super::SqliteResultExt;
use crate::DbError;

pub(crate) const LATEST: i64 = 1;

const V1: &str = "
CREATE TABLE IF NOT EXISTS contracts (
    id                  TEXT PRIMARY KEY,
    user_id             TEXT NOT NULL,
    title               TEXT NOT NULL,
    original_text       TEXT NOT NULL,
    source              TEXT NOT NULL
                            CHECK(source IN ('analyzed', 'compared', 'generated')),
    risk_level          TEXT
                            CHECK(risk_level IS NULL OR risk_level IN ('LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),
    contract_type       TEXT NOT NULL DEFAULT 'OTHER',
    recommended_actions TEXT NOT NULL DEFAULT '[]',
    compliance_flags    TEXT NOT NULL DEFAULT '[]',
    metadata            TEXT NOT NULL DEFAULT '{}',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contracts_user ON contracts(user_id, created_at);

CREATE TABLE IF NOT EXISTS contract_issues (
    id                 TEXT PRIMARY KEY,
    contract_id        TEXT NOT NULL REFERENCES contracts(id) ON DELETE CASCADE,
    position           INTEGER NOT NULL,
    category           TEXT NOT NULL,
    label              TEXT NOT NULL DEFAULT '',
    text               TEXT NOT NULL DEFAULT '',
    explanation        TEXT NOT NULL DEFAULT '',
    suggestion         TEXT NOT NULL DEFAULT '',
    severity           TEXT NOT NULL,
    severity_score     INTEGER NOT NULL CHECK(severity_score BETWEEN 1 AND 10),
    industry_relevance TEXT NOT NULL DEFAULT '[]',
    metadata           TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_issues_contract ON contract_issues(contract_id, position);

CREATE TABLE IF NOT EXISTS comparisons (
    id                   TEXT PRIMARY KEY,
    user_id              TEXT NOT NULL,
    original_contract_id TEXT NOT NULL REFERENCES contracts(id) ON DELETE CASCADE,
    revised_contract_id  TEXT NOT NULL REFERENCES contracts(id) ON DELETE CASCADE,
    differences          TEXT NOT NULL DEFAULT '{}',
    summary              TEXT NOT NULL DEFAULT '',
    created_at           TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comparisons_user ON comparisons(user_id, created_at);

CREATE TABLE IF NOT EXISTS user_preferences (
    user_id    TEXT PRIMARY KEY,
    industry   TEXT NOT NULL,
    region     TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS api_keys (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    user_id      TEXT NOT NULL DEFAULT 'default',
    key_hash     TEXT NOT NULL UNIQUE,
    created_at   TEXT NOT NULL,
    last_used_at TEXT
);
";

pub(crate) fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get(0)
        })
        .to_db()?;

    if current < 1 {
        apply(conn, 1, V1)?;
    }

    Ok(())
}

fn apply(conn: &Connection, version: i64, sql: &str) -> Result<(), DbError> {
    let tx = conn.unchecked_transaction().to_db()?;
    tx.execute_batch(sql).to_db()?;
    tx.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![version, Utc::now().to_rfc3339()],
    )
    .to_db()?;
    tx.commit().to_db()?;
    tracing::info!("sqlite schema migrated to v{version}");
    Ok(())
}
