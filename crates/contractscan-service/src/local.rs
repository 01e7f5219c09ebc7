use std::sync::Arc;

use async_trait::async_trait;
use contractscan_ai::{AiError, Analyzer};
use contractscan_core::comparison::{
    CompareContracts, ComparisonOutcome, ContractComparison, NewComparison,
};
use contractscan_core::contract::{
    AnalyzeContract, ContractFilter, ContractStats, NewContract, DEFAULT_TITLE,
};
use contractscan_core::generation::GeneratedContract;
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{
    Comparison, Contract, ContractRequirements, ContractSource, ContractType, Severity,
    UserPreferences,
};
use contractscan_db::{Database, DbError};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::{ContractService, ServiceError};

pub const DEFAULT_USER: &str = "default";

const ORIGINAL_TITLE: &str = "Original Contract";
const REVISED_TITLE: &str = "Revised Contract";

/// Local implementation backed by a database handle and a model backend.
#[derive(Clone)]
pub struct LocalService {
    db: Arc<dyn Database>,
    analyzer: Analyzer,
    user_id: String,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, analyzer: Analyzer) -> Self {
        Self {
            db,
            analyzer,
            user_id: DEFAULT_USER.to_string(),
        }
    }

    /// Same backends, scoped to another user.
    pub fn for_user(&self, user_id: &str) -> Self {
        Self {
            db: self.db.clone(),
            analyzer: self.analyzer.clone(),
            user_id: user_id.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn backend_name(&self) -> &str {
        self.analyzer.backend_name()
    }

    async fn store_compared(
        &self,
        title: Option<&str>,
        fallback: &str,
        text: &str,
        risk: Severity,
        role: &str,
        analysis: &ContractComparison,
    ) -> Result<Contract, ServiceError> {
        let mut metadata = Map::new();
        metadata.insert("comparison_role".into(), json!(role));
        let input = NewContract {
            user_id: self.user_id.clone(),
            title: non_blank(title).unwrap_or(fallback).to_string(),
            original_text: text.to_string(),
            source: ContractSource::Compared,
            risk_level: Some(risk),
            contract_type: ContractType::Other,
            recommended_actions: analysis.risk_assessment.improvements.clone(),
            compliance_flags: analysis.risk_assessment.concerns.clone(),
            issues: vec![],
            metadata,
        };
        Ok(self.db.create_contract(&input).await?)
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<AiError> for ServiceError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            AiError::NotConfigured(msg) => ServiceError::Unavailable(msg),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl ContractService for LocalService {
    async fn analyze_contract(&self, input: &AnalyzeContract) -> Result<Contract, ServiceError> {
        let industry = non_blank(input.industry.as_deref());
        let region = non_blank(input.region.as_deref());
        let (industry, region) = match (industry, region) {
            (Some(i), Some(r)) => (i.to_string(), r.to_string()),
            _ => {
                let prefs = self.db.get_preferences(&self.user_id).await?;
                (
                    industry.map(String::from).unwrap_or(prefs.industry),
                    region.map(String::from).unwrap_or(prefs.region),
                )
            }
        };

        let analysis = self
            .analyzer
            .analyze(&input.contract_text, &industry, &region)
            .await?;

        let mut metadata = Map::new();
        metadata.insert("industry".into(), json!(industry));
        metadata.insert("region".into(), json!(region));
        if !analysis.industry_risk.is_empty() {
            metadata.insert("industry_risk".into(), json!(analysis.industry_risk));
        }
        if analysis.degraded {
            metadata.insert("degraded".into(), Value::Bool(true));
        }

        let new = NewContract {
            user_id: self.user_id.clone(),
            title: non_blank(input.title.as_deref())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            original_text: input.contract_text.clone(),
            source: ContractSource::Analyzed,
            risk_level: Some(analysis.risk_level),
            contract_type: analysis.contract_type,
            recommended_actions: analysis.recommended_actions,
            compliance_flags: analysis.compliance_flags,
            issues: analysis.issues,
            metadata,
        };
        let contract = self.db.create_contract(&new).await?;
        info!(
            "analyzed contract {} for {}: risk={} issues={}",
            contract.id,
            self.user_id,
            analysis.risk_level.as_str(),
            contract.issues.len()
        );
        Ok(contract)
    }

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, ServiceError> {
        if matches!(filter.limit, Some(n) if n <= 0) {
            return Err(ServiceError::InvalidInput("limit must be positive".into()));
        }
        Ok(self.db.list_contracts(&self.user_id, filter).await?)
    }

    async fn get_contract(&self, id: &str) -> Result<Contract, ServiceError> {
        Ok(self.db.get_contract(&self.user_id, id).await?)
    }

    async fn delete_contract(&self, id: &str) -> Result<(), ServiceError> {
        self.db.delete_contract(&self.user_id, id).await?;
        info!("deleted contract {id} for {}", self.user_id);
        Ok(())
    }

    async fn contract_stats(&self) -> Result<ContractStats, ServiceError> {
        Ok(self.db.contract_stats(&self.user_id).await?)
    }

    async fn compare_contracts(
        &self,
        input: &CompareContracts,
    ) -> Result<ComparisonOutcome, ServiceError> {
        let analysis = self
            .analyzer
            .compare(&input.original_text, &input.revised_text)
            .await?;

        let original_contract = self
            .store_compared(
                input.original_title.as_deref(),
                ORIGINAL_TITLE,
                &input.original_text,
                analysis.risk_assessment.original_risk,
                "original",
                &analysis,
            )
            .await?;
        let revised_contract = self
            .store_compared(
                input.revised_title.as_deref(),
                REVISED_TITLE,
                &input.revised_text,
                analysis.risk_assessment.revised_risk,
                "revised",
                &analysis,
            )
            .await?;

        let comparison = self
            .db
            .create_comparison(&NewComparison {
                user_id: self.user_id.clone(),
                original_contract_id: original_contract.id.clone(),
                revised_contract_id: revised_contract.id.clone(),
                differences: analysis.differences.clone(),
                summary: analysis.summary.clone(),
            })
            .await?;
        info!(
            "compared contracts {} -> {} for {}: {} -> {}",
            original_contract.id,
            revised_contract.id,
            self.user_id,
            analysis.risk_assessment.original_risk.as_str(),
            analysis.risk_assessment.revised_risk.as_str()
        );

        Ok(ComparisonOutcome {
            comparison,
            original_contract,
            revised_contract,
            analysis,
        })
    }

    async fn get_comparison(&self, id: &str) -> Result<Comparison, ServiceError> {
        Ok(self.db.get_comparison(&self.user_id, id).await?)
    }

    async fn list_comparisons(&self) -> Result<Vec<Comparison>, ServiceError> {
        Ok(self.db.list_comparisons(&self.user_id).await?)
    }

    async fn generate_contract(
        &self,
        input: &ContractRequirements,
    ) -> Result<GeneratedContract, ServiceError> {
        let contract_text = self.analyzer.generate(input).await?;

        let mut metadata = Map::new();
        metadata.insert("industry".into(), json!(input.industry));
        metadata.insert("region".into(), json!(input.region));
        metadata.insert("project_type".into(), json!(input.project_type));

        let contract = self
            .db
            .create_contract(&NewContract {
                user_id: self.user_id.clone(),
                title: input.title(),
                original_text: contract_text.clone(),
                source: ContractSource::Generated,
                risk_level: None,
                contract_type: ContractType::Other,
                recommended_actions: vec![],
                compliance_flags: vec![],
                issues: vec![],
                metadata,
            })
            .await?;
        info!("generated contract {} for {}", contract.id, self.user_id);

        Ok(GeneratedContract {
            contract_id: contract.id,
            contract_text,
        })
    }

    async fn get_preferences(&self) -> Result<UserPreferences, ServiceError> {
        Ok(self.db.get_preferences(&self.user_id).await?)
    }

    async fn update_preferences(
        &self,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, ServiceError> {
        for (field, value) in [("industry", &update.industry), ("region", &update.region)] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ServiceError::InvalidInput(format!("{field} must not be blank")));
            }
        }
        let trimmed = UpdatePreferences {
            industry: update.industry.as_deref().map(|s| s.trim().to_string()),
            region: update.region.as_deref().map(|s| s.trim().to_string()),
        };
        Ok(self.db.upsert_preferences(&self.user_id, &trimmed).await?)
    }
}
