use async_trait::async_trait;
use concierge_common::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Sampling knobs forwarded to the provider. `None` leaves the provider default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub context_window: Option<u32>,
    pub temperature: Option<f32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate raw text for a single prompt. Any transport failure, timeout
    /// or non-success status is an error; there are no retries.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<LlmResponse>;

    /// Check if the LLM service is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Base address of the generation service, for status reporting.
    fn endpoint(&self) -> &str;
}
