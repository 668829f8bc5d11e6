use super::types::{TavilySearchRequest, normalize};
use crate::SearchClient;
use async_trait::async_trait;
use concierge_common::{ConciergeError, Result};
use concierge_core::SearchResult;
use concierge_http::{HttpClient, RequestOpts};
use serde_json::Value;
use std::time::Duration;

/// Minimal client for the Tavily Search API.
#[derive(Clone)]
pub struct TavilyClient {
    http: HttpClient,
    token: String,
}

impl TavilyClient {
    pub fn new(endpoint: &str, token: String, timeout: Duration) -> Result<Self> {
        let http = HttpClient::new(endpoint)
            .map_err(|e| ConciergeError::Config(format!("invalid Tavily endpoint: {e}")))?
            .with_timeout(timeout);
        Ok(Self { http, token })
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>> {
        let req = TavilySearchRequest { query, max_results };
        let resp: Value = self
            .http
            .post_json(
                "search",
                &req,
                RequestOpts {
                    bearer: Some(&self.token),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| ConciergeError::Search(e.to_string()))?;

        let mut rows = normalize(&resp);
        rows.truncate(max_results as usize);
        tracing::info!(
            target: "web.tavily",
            query,
            hit_count = rows.len(),
            "tavily.search.page"
        );
        Ok(rows)
    }

    fn provider_name(&self) -> &str {
        "tavily"
    }
}
