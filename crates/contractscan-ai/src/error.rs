use contractscan_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("model backend not configured: {0}")]
    NotConfigured(String),
    #[error("model endpoint returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("model returned an empty completion")]
    EmptyCompletion,
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<CoreError> for AiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidInput(msg) => AiError::InvalidInput(msg),
        }
    }
}
