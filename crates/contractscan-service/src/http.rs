use async_trait::async_trait;
use contractscan_core::comparison::{CompareContracts, ComparisonOutcome};
use contractscan_core::contract::{AnalyzeContract, ContractFilter, ContractStats};
use contractscan_core::generation::GeneratedContract;
use contractscan_core::preferences::UpdatePreferences;
use contractscan_core::{Comparison, Contract, ContractRequirements, UserPreferences};
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::{ContractService, ServiceError};

/// Async HTTP client implementation of ContractService.
/// Connects to a running contractscan-server.
pub struct HttpService {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            api_key: None,
        }
    }

    pub fn with_api_key(base_url: &str, key: String) -> Self {
        let mut svc = Self::new(base_url);
        svc.api_key = Some(key).filter(|k| !k.is_empty());
        svc
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {key}")),
            None => builder,
        }
    }

    /// Check if the server is reachable.
    /// Health endpoint is NOT authenticated.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn patch_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .patch(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let builder = self.client.delete(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error_with_status(status, resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST => ServiceError::InvalidInput(msg),
        StatusCode::SERVICE_UNAVAILABLE => ServiceError::Unavailable(msg),
        StatusCode::BAD_GATEWAY => ServiceError::Upstream(msg),
        _ => ServiceError::Internal(msg),
    }
}

fn contracts_path(filter: &ContractFilter) -> String {
    let mut params = Vec::new();
    if let Some(risk) = filter.risk_level {
        params.push(format!("risk={}", risk.as_str()));
    }
    if let Some(source) = filter.source {
        params.push(format!("source={}", source.as_str()));
    }
    if let Some(limit) = filter.limit {
        params.push(format!("limit={limit}"));
    }
    if params.is_empty() {
        "/api/contracts".to_string()
    } else {
        format!("/api/contracts?{}", params.join("&"))
    }
}

#[async_trait]
impl ContractService for HttpService {
    async fn analyze_contract(&self, input: &AnalyzeContract) -> Result<Contract, ServiceError> {
        self.post_json("/api/contracts/analyze", input).await
    }

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, ServiceError> {
        self.get_json(&contracts_path(filter)).await
    }

    async fn get_contract(&self, id: &str) -> Result<Contract, ServiceError> {
        self.get_json(&format!("/api/contracts/{id}")).await
    }

    async fn delete_contract(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/contracts/{id}")).await
    }

    async fn contract_stats(&self) -> Result<ContractStats, ServiceError> {
        self.get_json("/api/contracts/stats").await
    }

    async fn compare_contracts(
        &self,
        input: &CompareContracts,
    ) -> Result<ComparisonOutcome, ServiceError> {
        self.post_json("/api/contracts/compare", input).await
    }

    async fn get_comparison(&self, id: &str) -> Result<Comparison, ServiceError> {
        self.get_json(&format!("/api/comparisons/{id}")).await
    }

    async fn list_comparisons(&self) -> Result<Vec<Comparison>, ServiceError> {
        self.get_json("/api/comparisons").await
    }

    async fn generate_contract(
        &self,
        input: &ContractRequirements,
    ) -> Result<GeneratedContract, ServiceError> {
        self.post_json("/api/contracts/generate", input).await
    }

    async fn get_preferences(&self) -> Result<UserPreferences, ServiceError> {
        self.get_json("/api/user/preferences").await
    }

    async fn update_preferences(
        &self,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, ServiceError> {
        self.patch_json("/api/user/preferences", update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractscan_core::{ContractSource, Severity};

    #[test]
    fn contracts_path_without_filter() {
        assert_eq!(contracts_path(&ContractFilter::default()), "/api/contracts");
    }

    #[test]
    fn contracts_path_with_filter() {
        let filter = ContractFilter {
            risk_level: Some(Severity::Critical),
            source: Some(ContractSource::Generated),
            limit: Some(5),
        };
        assert_eq!(
            contracts_path(&filter),
            "/api/contracts?risk=CRITICAL&source=generated&limit=5"
        );
    }

    #[test]
    fn trailing_slash_trimmed() {
        let svc = HttpService::with_api_key("http://localhost:3720/", String::new());
        assert_eq!(svc.base_url(), "http://localhost:3720");
        assert!(svc.api_key.is_none());
    }
}
