//! Binds configuration to collaborators and serves the router.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use concierge_config::{ConciergeConfig, CurationConfig, ShortfallPolicy};
use concierge_core::classifier::{DEFAULT_AGGREGATOR_DOMAINS, DEFAULT_LISTICLE_PATTERN};
use concierge_core::curation::{DEFAULT_BANNED_RESTAURANT_PREFIX, DEFAULT_RESTAURANT_POOL};
use concierge_core::{ActivityShortfall, Curation};
use concierge_llm::{client_from_config, generation_options};
use concierge_web::search_from_config;

use crate::routes::{AppState, build_router};
use crate::service::Concierge;

pub struct Tether {
    state: AppState,
    listen: String,
    allowed_origins: Vec<String>,
}

impl Tether {
    pub fn from_config(cfg: &ConciergeConfig) -> Result<Self> {
        let llm = client_from_config(&cfg.llm).context("building generation client")?;
        let search = search_from_config(&cfg.search).context("building search client")?;
        let curation = curation_from_config(&cfg.curation).context("building curation policy")?;

        let concierge = Concierge::new(llm, search, curation)
            .with_options(generation_options(&cfg.llm))
            .with_max_results(cfg.search.max_results);

        Ok(Self {
            state: AppState {
                concierge: Arc::new(concierge),
            },
            listen: cfg.server.listen.clone(),
            allowed_origins: cfg.server.allowed_origins.clone(),
        })
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.allowed_origins)
    }

    /// Check the generation service once. Only ever warns.
    pub async fn probe(&self) {
        let llm = self.state.concierge.llm();
        match llm.health_check().await {
            Ok(true) => tracing::info!(
                model = llm.model_name(),
                endpoint = llm.endpoint(),
                "startup.llm.reachable"
            ),
            Ok(false) | Err(_) => tracing::warn!(
                model = llm.model_name(),
                endpoint = llm.endpoint(),
                "startup.llm.unreachable"
            ),
        }
    }

    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.listen)
            .await
            .with_context(|| format!("binding {}", self.listen))?;
        tracing::info!(listen = %self.listen, "server.listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("server.shutdown");
            })
            .await?;
        Ok(())
    }
}

/// Overlay configured lists on the built-in curation policy.
pub fn curation_from_config(cfg: &CurationConfig) -> concierge_common::Result<Curation> {
    let to_owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let domains = cfg
        .aggregator_domains
        .clone()
        .unwrap_or_else(|| to_owned(DEFAULT_AGGREGATOR_DOMAINS));
    let pool = cfg
        .restaurant_pool
        .clone()
        .unwrap_or_else(|| to_owned(DEFAULT_RESTAURANT_POOL));
    let policy = match cfg.activity_shortfall {
        ShortfallPolicy::Replace => ActivityShortfall::Replace,
        ShortfallPolicy::Retain => ActivityShortfall::Retain,
    };
    Curation::from_lists(
        cfg.listicle_pattern
            .as_deref()
            .unwrap_or(DEFAULT_LISTICLE_PATTERN),
        domains,
        pool,
        cfg.banned_restaurant_prefix
            .as_deref()
            .unwrap_or(DEFAULT_BANNED_RESTAURANT_PREFIX),
        policy,
    )
}
