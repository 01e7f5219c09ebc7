pub mod mock;
pub mod openai;

use async_trait::async_trait;
use contractscan_prompts::PromptPair;

use crate::AiError;

/// Sampling temperature used for every ContractScan call.
pub const TEMPERATURE: f32 = 0.3;

/// One chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider to constrain output to a JSON object.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn json(prompt: PromptPair, max_tokens: u32) -> Self {
        Self {
            system: prompt.system,
            user: prompt.user,
            temperature: TEMPERATURE,
            max_tokens,
            json_mode: true,
        }
    }

    pub fn text(prompt: PromptPair, max_tokens: u32) -> Self {
        Self {
            json_mode: false,
            ..Self::json(prompt, max_tokens)
        }
    }
}

/// A language model that turns a prompt into raw completion text.
///
/// Backends return the text exactly as the model produced it. Extraction and
/// validation happen in `normalize`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Model identifier, when the backend has one.
    fn model_hint(&self) -> Option<&str> {
        None
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String, AiError>;
}
