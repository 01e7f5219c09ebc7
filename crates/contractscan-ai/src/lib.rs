pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;

pub use backend::mock::MockBackend;
pub use backend::openai::OpenAiBackend;
pub use backend::{CompletionBackend, CompletionRequest};
pub use config::ModelConfig;
pub use error::AiError;
pub use pipeline::Analyzer;
