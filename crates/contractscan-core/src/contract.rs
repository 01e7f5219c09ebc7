use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::severity::{ContractType, IssueType, Severity};

pub const DEFAULT_TITLE: &str = "Untitled Contract";

/// Contract texts longer than this are rejected before reaching the model.
pub const MAX_CONTRACT_CHARS: usize = 50_000;

/// How a stored contract came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractSource {
    Analyzed,
    Compared,
    Generated,
}

impl ContractSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractSource::Analyzed => "analyzed",
            ContractSource::Compared => "compared",
            ContractSource::Generated => "generated",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ContractSource::Analyzed => "Analyzed",
            ContractSource::Compared => "Compared",
            ContractSource::Generated => "Generated",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "analyzed" => Some(ContractSource::Analyzed),
            "compared" => Some(ContractSource::Compared),
            "generated" => Some(ContractSource::Generated),
            _ => None,
        }
    }
}

impl fmt::Display for ContractSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One flagged clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractIssue {
    pub category: IssueType,
    /// Label as the model wrote it, e.g. "Revision Policy".
    #[serde(default)]
    pub label: String,
    /// Quoted clause text.
    pub text: String,
    pub explanation: String,
    pub suggestion: String,
    pub severity: Severity,
    /// Always within 1..=10.
    pub severity_score: u8,
    #[serde(default)]
    pub industry_relevance: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub original_text: String,
    pub source: ContractSource,
    /// `None` for generated contracts, which are never analyzed.
    pub risk_level: Option<Severity>,
    pub contract_type: ContractType,
    pub recommended_actions: Vec<String>,
    pub compliance_flags: Vec<String>,
    pub issues: Vec<ContractIssue>,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a contract row and its issues.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub user_id: String,
    pub title: String,
    pub original_text: String,
    pub source: ContractSource,
    pub risk_level: Option<Severity>,
    pub contract_type: ContractType,
    pub recommended_actions: Vec<String>,
    pub compliance_flags: Vec<String>,
    pub issues: Vec<ContractIssue>,
    pub metadata: Map<String, Value>,
}

/// Request body for an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeContract {
    #[serde(default)]
    pub title: Option<String>,
    pub contract_text: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractFilter {
    pub risk_level: Option<Severity>,
    pub source: Option<ContractSource>,
    pub limit: Option<i64>,
}

/// Dashboard counters for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractStats {
    pub total_contracts: i64,
    pub total_issues: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

impl ContractStats {
    pub fn record(&mut self, level: Severity, count: i64) {
        match level {
            Severity::Low => self.low += count,
            Severity::Medium => self.medium += count,
            Severity::High => self.high += count,
            Severity::Critical => self.critical += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_source_parse_str_all() {
        assert_eq!(ContractSource::parse_str("analyzed"), Some(ContractSource::Analyzed));
        assert_eq!(ContractSource::parse_str("compared"), Some(ContractSource::Compared));
        assert_eq!(ContractSource::parse_str("generated"), Some(ContractSource::Generated));
        assert_eq!(ContractSource::parse_str("uploaded"), None);
        assert_eq!(ContractSource::parse_str(""), None);
    }

    #[test]
    fn analyze_request_optional_fields() {
        let req: AnalyzeContract =
            serde_json::from_str(r#"{"contract_text": "The Client shall pay..."}"#).unwrap();
        assert!(req.title.is_none());
        assert!(req.industry.is_none());
        assert!(req.region.is_none());
    }

    #[test]
    fn stats_record_accumulates() {
        let mut stats = ContractStats::default();
        stats.record(Severity::High, 2);
        stats.record(Severity::High, 1);
        stats.record(Severity::Low, 4);
        assert_eq!(stats.high, 3);
        assert_eq!(stats.low, 4);
        assert_eq!(stats.critical, 0);
    }
}
