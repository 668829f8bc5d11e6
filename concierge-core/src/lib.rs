//! Extraction and repair pipeline for generated itineraries.
//!
//! Raw generator text goes through [`extract::extract_json_object`], the
//! resulting candidate (or nothing) through [`repair::repair`], and the
//! output is always an [`model::Itinerary`] that satisfies the content
//! contract. When generation fails outright, [`fallback::synthesize`] builds
//! the whole itinerary from search context and static content.
//!
//! Everything here is synchronous and free of I/O. Policy (deny lists, the
//! fallback name pool) is carried by an immutable [`curation::Curation`] and
//! randomness is always passed in by the caller.
//!
//! # Examples
//! ```
//! use chrono::NaiveDate;
//! use concierge_core::{Curation, TripContext, extract_json_object, repair};
//! use concierge_core::model::{Booking, Preferences};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let raw = r#"Here you go: {"activities": ["Heard Museum"], "restaurants": []}"#;
//! let candidate = extract_json_object(raw).map(serde_json::Value::Object);
//!
//! let booking = Booking::default();
//! let preferences = Preferences::default();
//! let trip = TripContext {
//!     booking: &booking,
//!     preferences: &preferences,
//!     search_results: &[],
//!     today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//! };
//! let itinerary = repair(
//!     &Curation::default(),
//!     candidate.as_ref(),
//!     &trip,
//!     &mut StdRng::seed_from_u64(1),
//! );
//! assert!(itinerary.plan.len() >= 2);
//! assert_eq!(itinerary.restaurants.len(), 3);
//! ```
pub mod classifier;
mod coerce;
pub mod curation;
pub mod dates;
pub mod extract;
pub mod fallback;
pub mod model;
pub mod prompt;
pub mod repair;

pub use classifier::ContentClassifier;
pub use curation::{ActivityShortfall, Curation, TripContext};
pub use extract::extract_json_object;
pub use fallback::synthesize;
pub use model::{ConciergeRequest, Itinerary, SearchResult};
pub use repair::repair;
