use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Structured input for generating a new contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRequirements {
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default = "default_project_type")]
    pub project_type: String,
    pub client_name: String,
    pub freelancer_name: String,
    pub project_description: String,
    #[serde(default)]
    pub deliverables: Vec<String>,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_industry() -> String {
    "general".into()
}

fn default_project_type() -> String {
    "fixed_price".into()
}

fn default_region() -> String {
    "US".into()
}

impl ContractRequirements {
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("client_name", &self.client_name),
            ("freelancer_name", &self.freelancer_name),
            ("project_description", &self.project_description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidInput(format!("{field} is required")));
            }
        }
        Ok(())
    }

    /// Title used when the generated contract is stored.
    pub fn title(&self) -> String {
        format!("{} Contract for {}", self.project_type, self.client_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContract {
    pub contract_id: String,
    pub contract_text: String,
}
