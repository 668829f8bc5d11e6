use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderValue,
    routing::{get, post},
};
use chrono::Local;
use concierge_core::ConciergeRequest;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::{Concierge, ConciergeResponse};

#[derive(Clone)]
pub struct AppState {
    pub concierge: Arc<Concierge>,
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api/ai/concierge", post(concierge_handler))
        .route("/healthz", get(health_handler))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Origins are matched exactly; credentials are allowed, so methods and
/// headers mirror the preflight request instead of using a wildcard.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "server.cors.invalid_origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn concierge_handler(State(state): State<AppState>, body: Bytes) -> Json<ConciergeResponse> {
    let request = ConciergeRequest::from_slice(&body);
    let today = Local::now().date_naive();
    let mut rng = StdRng::from_entropy();
    Json(state.concierge.plan(&request, today, &mut rng).await)
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm = state.concierge.llm();
    Json(json!({
        "ok": true,
        "model": llm.model_name(),
        "ollama_url": llm.endpoint(),
    }))
}
