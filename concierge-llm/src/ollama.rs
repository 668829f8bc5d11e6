use crate::traits::{GenerationOptions, LlmClient, LlmResponse};
use async_trait::async_trait;
use concierge_common::{ConciergeError, Result};
use concierge_http::{HttpClient, HttpError, RequestOpts};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
/// Construction performs no I/O; call [`LlmClient::health_check`] to probe.
pub struct OllamaClient {
    http: HttpClient,
    endpoint: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaClient {
    /// Build a client for `endpoint`, which may be the server root or the
    /// full `/api/generate` URL.
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        let endpoint = server_root(endpoint);
        let http = HttpClient::new(&endpoint)
            .map_err(|e| ConciergeError::Config(format!("invalid Ollama endpoint: {e}")))?
            .with_timeout(timeout);
        Ok(Self {
            http,
            endpoint,
            model: model.to_string(),
        })
    }

    fn payload(&self, prompt: &str, options: &GenerationOptions) -> JsonValue {
        let mut opts = Map::new();
        if let Some(max_tok) = options.max_tokens {
            opts.insert("num_predict".to_string(), json!(max_tok));
        }
        if let Some(ctx) = options.context_window {
            opts.insert("num_ctx".to_string(), json!(ctx));
        }
        if let Some(temp) = options.temperature {
            opts.insert("temperature".to_string(), json!(temp));
        }
        json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": opts
        })
    }
}

fn server_root(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/api/generate")
        .unwrap_or(trimmed)
        .to_string()
}

fn map_http_error(err: HttpError) -> ConciergeError {
    match err {
        HttpError::Timeout(_) => ConciergeError::Timeout,
        HttpError::Network(msg) => ConciergeError::Generation(format!("{OLLAMA_CONNECTION_ERROR} ({msg})")),
        other => ConciergeError::Generation(other.to_string()),
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<LlmResponse> {
        let payload = self.payload(prompt, options);
        tracing::info!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "ollama.generate.start"
        );

        let resp: GenerateResponse = self
            .http
            .post_json("api/generate", &payload, RequestOpts::default())
            .await
            .map_err(|e| {
                tracing::warn!(model = %self.model, error = %e, "ollama.generate.error");
                map_http_error(e)
            })?;

        tracing::info!(
            model = %self.model,
            response_chars = resp.response.chars().count(),
            eval_count = ?resp.eval_count,
            "ollama.generate.ok"
        );

        Ok(LlmResponse {
            text: resp.response,
            model: resp.model.or_else(|| Some(self.model.clone())),
            tokens_used: resp.eval_count,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = self
            .http
            .get_json::<JsonValue>(
                "api/tags",
                RequestOpts {
                    timeout: Some(Duration::from_secs(5)),
                    ..Default::default()
                },
            )
            .await;
        match probe {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "ollama.health.unreachable");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
