use thiserror::Error;

use crate::models::{PromptSpec, RawModelResponse};

/// Failure talking to the generative model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to decode API response: {0}")]
    InvalidEnvelope(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

/// Trait for generative AI backends (Gemini, test stubs, etc.)
///
/// One call per request. Implementations never retry.
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &PromptSpec) -> Result<RawModelResponse, ModelError>;

    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}
