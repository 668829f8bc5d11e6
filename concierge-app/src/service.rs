//! Per-request orchestration: search, prompt, generate, extract, repair.

use std::sync::Arc;

use chrono::NaiveDate;
use concierge_common::{ConciergeError, DebugInfo, Result};
use concierge_core::prompt::{build_prompt, search_query};
use concierge_core::{
    ConciergeRequest, Curation, Itinerary, SearchResult, TripContext, extract_json_object, repair,
    synthesize,
};
use concierge_llm::traits::{GenerationOptions, LlmClient};
use concierge_web::SearchClient;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

/// Itinerary plus the optional `_debug` annotation.
#[derive(Debug, Clone, Serialize)]
pub struct ConciergeResponse {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    #[serde(rename = "_debug", skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

pub struct Concierge {
    llm: Arc<dyn LlmClient + Send + Sync>,
    search: Arc<dyn SearchClient + Send + Sync>,
    curation: Curation,
    options: GenerationOptions,
    max_results: u32,
}

impl Concierge {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        search: Arc<dyn SearchClient + Send + Sync>,
        curation: Curation,
    ) -> Self {
        Self {
            llm,
            search,
            curation,
            options: GenerationOptions::default(),
            max_results: 10,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient + Send + Sync> {
        &self.llm
    }

    /// Run the whole pipeline. Never fails: generation problems fall back to
    /// a synthesized itinerary carrying a `_debug` annotation.
    pub async fn plan<R>(
        &self,
        request: &ConciergeRequest,
        today: NaiveDate,
        rng: &mut R,
    ) -> ConciergeResponse
    where
        R: Rng + Send + ?Sized,
    {
        let results = self.search_context(request).await;
        let outcome = self.generate_candidate(request, &results).await;

        let trip = TripContext {
            booking: &request.booking,
            preferences: &request.preferences,
            search_results: &results,
            today,
        };
        match outcome {
            Ok(candidate) => ConciergeResponse {
                itinerary: repair(&self.curation, Some(&candidate), &trip, rng),
                debug: None,
            },
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "concierge.generate.fallback");
                ConciergeResponse {
                    itinerary: synthesize(&self.curation, &trip, rng),
                    debug: Some(err.debug_info()),
                }
            }
        }
    }

    async fn search_context(&self, request: &ConciergeRequest) -> Vec<SearchResult> {
        let query = search_query(&request.booking.location);
        tracing::info!(
            provider = self.search.provider_name(),
            query = %query,
            "concierge.search.start"
        );
        match self.search.search(&query, self.max_results).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "concierge.search.error");
                Vec::new()
            }
        }
    }

    async fn generate_candidate(
        &self,
        request: &ConciergeRequest,
        results: &[SearchResult],
    ) -> Result<Value> {
        let prompt = build_prompt(request, results);
        let response = self.llm.generate(&prompt, &self.options).await?;
        let candidate = extract_json_object(&response.text).ok_or(ConciergeError::Extraction)?;
        tracing::debug!(keys = candidate.len(), "concierge.extract.ok");
        Ok(Value::Object(candidate))
    }
}
