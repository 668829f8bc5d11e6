//! HTTP surface of the concierge service.
//!
//! `POST /api/ai/concierge` turns a booking into an itinerary; `GET /healthz`
//! reports the configured generation model and address.
pub mod routes;
pub mod service;
pub mod tether;

pub use routes::{AppState, build_router};
pub use service::{Concierge, ConciergeResponse};
pub use tether::Tether;
