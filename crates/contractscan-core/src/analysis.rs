use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::ContractIssue;
use crate::severity::{ContractType, Severity};

/// Validated result of one model analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    pub risk_level: Severity,
    pub contract_type: ContractType,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default)]
    pub compliance_flags: Vec<String>,
    #[serde(default)]
    pub issues: Vec<ContractIssue>,
    /// Per-industry risk on a 0..=10 scale.
    #[serde(default)]
    pub industry_risk: BTreeMap<String, u8>,
    /// Set when the model output could not be parsed at all.
    #[serde(default)]
    pub degraded: bool,
}
