//! Text-generation integration for the concierge service.
//!
//! This crate exposes the [`traits::LlmClient`] interface the pipeline calls
//! and an Ollama implementation. [`client_from_config`] builds the
//! configured client; no network traffic happens until the first call.
//!
//! # Examples
//! ```
//! use concierge_config::LlmConfig;
//! use concierge_llm::{client_from_config, generation_options};
//!
//! let cfg = LlmConfig::default();
//! let client = client_from_config(&cfg).unwrap();
//! assert_eq!(client.model_name(), "llama3");
//! assert_eq!(generation_options(&cfg).max_tokens, Some(256));
//! ```
pub mod ollama;
pub mod traits;

use concierge_common::Result;
use concierge_config::{LlmConfig, LlmProvider};
use ollama::OllamaClient;
use std::sync::Arc;
use std::time::Duration;
use traits::{GenerationOptions, LlmClient};

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Build the configured generation client.
pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config.provider {
        LlmProvider::Ollama => {
            let model = if config.model.trim().is_empty() {
                DEFAULT_OLLAMA_MODEL
            } else {
                config.model.trim()
            };
            let client = OllamaClient::new(
                &config.endpoint,
                model,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
    }
}

/// Sampling options derived from configuration.
pub fn generation_options(config: &LlmConfig) -> GenerationOptions {
    GenerationOptions {
        max_tokens: Some(config.max_tokens),
        context_window: Some(config.context_window),
        temperature: Some(config.temperature),
    }
}
