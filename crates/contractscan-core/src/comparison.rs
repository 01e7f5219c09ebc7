use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::Contract;
use crate::severity::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedClause {
    pub original: String,
    pub revised: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Differences {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<ModifiedClause>,
}

impl Differences {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub original_risk: Severity,
    pub revised_risk: Severity,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

/// Validated result of one model comparison call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractComparison {
    pub differences: Differences,
    pub summary: String,
    pub risk_assessment: RiskAssessment,
}

/// Stored comparison between two contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub id: String,
    pub user_id: String,
    pub original_contract_id: String,
    pub revised_contract_id: String,
    pub differences: Differences,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComparison {
    pub user_id: String,
    pub original_contract_id: String,
    pub revised_contract_id: String,
    pub differences: Differences,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareContracts {
    pub original_text: String,
    pub revised_text: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub revised_title: Option<String>,
}

/// Response of a compare request: the stored rows plus the model's view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub comparison: Comparison,
    pub original_contract: Contract,
    pub revised_contract: Contract,
    pub analysis: ContractComparison,
}
