use async_trait::async_trait;
use contractscan_core::comparison::{CompareContracts, ComparisonOutcome};
use contractscan_core::contract::{AnalyzeContract, ContractFilter, ContractStats};
use contractscan_core::generation::GeneratedContract;
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{Comparison, Contract, ContractRequirements, UserPreferences};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model backend is not configured on this server.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The model endpoint failed or answered with something unusable.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Contract analysis, comparison and generation for a single user.
///
/// The server and the CLI program against this trait.
/// `LocalService` talks to the database and the model backend directly.
/// `HttpService` wraps an async HTTP client pointed at a running server.
#[async_trait]
pub trait ContractService: Send + Sync {
    // -- Contracts --
    async fn analyze_contract(&self, input: &AnalyzeContract) -> Result<Contract, ServiceError>;
    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, ServiceError>;
    async fn get_contract(&self, id: &str) -> Result<Contract, ServiceError>;
    async fn delete_contract(&self, id: &str) -> Result<(), ServiceError>;
    async fn contract_stats(&self) -> Result<ContractStats, ServiceError>;

    // -- Comparisons --
    async fn compare_contracts(
        &self,
        input: &CompareContracts,
    ) -> Result<ComparisonOutcome, ServiceError>;
    async fn get_comparison(&self, id: &str) -> Result<Comparison, ServiceError>;
    async fn list_comparisons(&self) -> Result<Vec<Comparison>, ServiceError>;

    // -- Generation --
    async fn generate_contract(
        &self,
        input: &ContractRequirements,
    ) -> Result<GeneratedContract, ServiceError>;

    // -- Preferences --
    async fn get_preferences(&self) -> Result<UserPreferences, ServiceError>;
    async fn update_preferences(
        &self,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, ServiceError>;
}
