use std::sync::Arc;
use std::time::Instant;

use contractscan_core::contract::MAX_CONTRACT_CHARS;
use contractscan_core::{ContractAnalysis, ContractComparison, ContractRequirements};
use contractscan_prompts::{analyze, compare, generate, AnalysisContext};
use tracing::{info, warn};

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::{extract, normalize, AiError};

/// Prompt -> model -> normalized result, for each of the three model calls.
#[derive(Clone)]
pub struct Analyzer {
    backend: Arc<dyn CompletionBackend>,
    max_tokens: u32,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn CompletionBackend>, max_tokens: u32) -> Self {
        Self {
            backend,
            max_tokens,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn analyze(
        &self,
        contract_text: &str,
        industry: &str,
        region: &str,
    ) -> Result<ContractAnalysis, AiError> {
        check_text("contract text", contract_text)?;
        let prompt = analyze::build(&AnalysisContext {
            contract_text: contract_text.to_string(),
            industry: industry.to_string(),
            region: region.to_string(),
        });
        let raw = self
            .call("analyze", CompletionRequest::json(prompt, self.max_tokens))
            .await?;
        let analysis = normalize::analysis(&raw);
        if analysis.degraded {
            warn!("analyze: {} returned unparseable output", self.backend.name());
        }
        Ok(analysis)
    }

    pub async fn compare(&self, original: &str, revised: &str) -> Result<ContractComparison, AiError> {
        check_text("original text", original)?;
        check_text("revised text", revised)?;
        let prompt = compare::build(original, revised);
        let raw = self
            .call("compare", CompletionRequest::json(prompt, self.max_tokens))
            .await?;
        normalize::comparison(&raw)
    }

    /// Generate contract text. The result is trimmed and unfenced.
    pub async fn generate(&self, req: &ContractRequirements) -> Result<String, AiError> {
        req.validate()?;
        let prompt = generate::build(req);
        let raw = self
            .call("generate", CompletionRequest::text(prompt, self.max_tokens))
            .await?;
        let text = extract::strip_fences(&raw);
        if text.is_empty() {
            return Err(AiError::EmptyCompletion);
        }
        Ok(text.to_string())
    }

    async fn call(&self, op: &str, req: CompletionRequest) -> Result<String, AiError> {
        let started = Instant::now();
        info!(
            "{op}: calling {} (model={}, json={})",
            self.backend.name(),
            self.backend.model_hint().unwrap_or("-"),
            req.json_mode
        );
        let result = self.backend.complete(&req).await;
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(text) => info!("{op}: {} chars in {elapsed_ms}ms", text.len()),
            Err(e) => warn!("{op}: failed after {elapsed_ms}ms: {e}"),
        }
        result
    }
}

fn check_text(what: &str, text: &str) -> Result<(), AiError> {
    if text.trim().is_empty() {
        return Err(AiError::InvalidInput(format!("{what} is required")));
    }
    let len = text.chars().count();
    if len > MAX_CONTRACT_CHARS {
        return Err(AiError::InvalidInput(format!(
            "{what} is too long ({len} characters, max {MAX_CONTRACT_CHARS})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockBackend;
    use contractscan_core::{IssueType, Severity};

    const ANALYSIS: &str = r#"{"riskLevel":"HIGH","type":"SERVICE","recommendedActions":["Add a kill fee"],"complianceFlags":[],"issues":[{"type":"Termination","text":"Client may cancel at any time","explanation":"No kill fee","suggestion":"Add 25% kill fee","severity":"HIGH","severityScore":8,"industryRelevance":["general"]}]}"#;

    fn analyzer(mock: Arc<MockBackend>) -> Analyzer {
        Analyzer::new(mock, 2000)
    }

    fn requirements() -> ContractRequirements {
        serde_json::from_value(serde_json::json!({
            "industry": "web_development",
            "client_name": "Acme",
            "freelancer_name": "Robin",
            "project_description": "Landing page"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn analyze_normalizes_and_uses_json_mode() {
        let mock = Arc::new(MockBackend::success(ANALYSIS));
        let a = analyzer(mock.clone())
            .analyze("Client may cancel at any time.", "web_development", "US")
            .await
            .unwrap();
        assert_eq!(a.risk_level, Severity::High);
        assert_eq!(a.issues[0].category, IssueType::Termination);

        let reqs = mock.requests();
        assert_eq!(reqs.len(), 1);
        assert!(reqs[0].json_mode);
        assert_eq!(reqs[0].max_tokens, 2000);
        assert!((reqs[0].temperature - 0.3).abs() < f32::EPSILON);
        assert!(reqs[0].user.contains("Client may cancel at any time."));
    }

    #[tokio::test]
    async fn analyze_rejects_empty_and_oversized() {
        let mock = Arc::new(MockBackend::success(ANALYSIS));
        let an = analyzer(mock.clone());
        assert!(matches!(
            an.analyze("   ", "general", "US").await,
            Err(AiError::InvalidInput(_))
        ));
        let huge = "a".repeat(MAX_CONTRACT_CHARS + 1);
        assert!(matches!(
            an.analyze(&huge, "general", "US").await,
            Err(AiError::InvalidInput(_))
        ));
        let exact = "a".repeat(MAX_CONTRACT_CHARS);
        assert!(an.analyze(&exact, "general", "US").await.is_ok());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn analyze_garbage_is_degraded_not_error() {
        let mock = Arc::new(MockBackend::success("Sorry, I can't do that."));
        let a = analyzer(mock).analyze("text", "general", "US").await.unwrap();
        assert!(a.degraded);
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        let mock = Arc::new(MockBackend::failure("overloaded"));
        assert!(matches!(
            analyzer(mock).analyze("text", "general", "US").await,
            Err(AiError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn compare_requires_both_texts() {
        let mock = Arc::new(MockBackend::success("{}"));
        let an = analyzer(mock.clone());
        assert!(matches!(an.compare("a", "").await, Err(AiError::InvalidInput(_))));
        assert!(matches!(an.compare("", "b").await, Err(AiError::InvalidInput(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn compare_malformed() {
        let mock = Arc::new(MockBackend::success("{}"));
        assert!(matches!(
            analyzer(mock).compare("a", "b").await,
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn generate_strips_fence_and_uses_text_mode() {
        let mock = Arc::new(MockBackend::success("```markdown\n# AGREEMENT\n\nBody\n```\n"));
        let text = analyzer(mock.clone()).generate(&requirements()).await.unwrap();
        assert_eq!(text, "# AGREEMENT\n\nBody");
        assert!(!mock.requests()[0].json_mode);
    }

    #[tokio::test]
    async fn generate_empty_and_invalid() {
        let mock = Arc::new(MockBackend::success("   "));
        assert!(matches!(
            analyzer(mock.clone()).generate(&requirements()).await,
            Err(AiError::EmptyCompletion)
        ));

        let mut req = requirements();
        req.client_name = String::new();
        match analyzer(mock).generate(&req).await {
            Err(AiError::InvalidInput(msg)) => assert_eq!(msg, "client_name is required"),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }
}
