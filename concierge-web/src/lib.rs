//! Local search context for itinerary prompts.
//!
//! - [`SearchClient`]: query in, normalized [`SearchResult`] rows out
//! - Tavily Search API client (`tavily`)
//! - [`DisabledSearch`] for deployments without a search credential

pub mod tavily;

use async_trait::async_trait;
use concierge_common::Result;
use concierge_config::{SearchConfig, SearchProvider};
use concierge_core::SearchResult;
use std::sync::Arc;
use std::time::Duration;
use tavily::TavilyClient;

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Search for `query`, returning at most `max_results` normalized rows.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>>;

    fn provider_name(&self) -> &str;
}

/// Search that is switched off; always answers with no rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSearch;

#[async_trait]
impl SearchClient for DisabledSearch {
    async fn search(&self, query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        tracing::debug!(query, "search.disabled.skip");
        Ok(Vec::new())
    }

    fn provider_name(&self) -> &str {
        "disabled"
    }
}

/// Build the configured search client. A missing credential disables search
/// instead of failing.
pub fn search_from_config(config: &SearchConfig) -> Result<Arc<dyn SearchClient + Send + Sync + 'static>> {
    match (config.provider, config.resolved_api_key()) {
        (SearchProvider::Tavily, Some(key)) => {
            let client = TavilyClient::new(
                &config.endpoint,
                key,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        (SearchProvider::Tavily, None) => {
            tracing::info!("search.disabled.no_credential");
            Ok(Arc::new(DisabledSearch))
        }
        (SearchProvider::None, _) => Ok(Arc::new(DisabledSearch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_search_returns_no_rows() {
        let rows = DisabledSearch.search("Phoenix restaurants", 10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn unresolved_credential_disables_search() {
        let cfg = SearchConfig {
            api_key: Some("${UNSET_TAVILY_KEY_FOR_TEST}".into()),
            ..SearchConfig::default()
        };
        let client = search_from_config(&cfg).unwrap();
        assert_eq!(client.provider_name(), "disabled");

        let cfg = SearchConfig {
            api_key: Some("tvly-abc".into()),
            ..SearchConfig::default()
        };
        assert_eq!(search_from_config(&cfg).unwrap().provider_name(), "tavily");

        let cfg = SearchConfig {
            provider: SearchProvider::None,
            api_key: Some("tvly-abc".into()),
            ..SearchConfig::default()
        };
        assert_eq!(search_from_config(&cfg).unwrap().provider_name(), "disabled");
    }
}
