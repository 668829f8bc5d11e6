//! Request and itinerary types.
//!
//! Inbound types ([`ConciergeRequest`], [`Booking`], [`Preferences`]) are
//! decoded leniently from arbitrary JSON: callers send loosely shaped bodies
//! and a missing or mistyped field degrades to its empty default instead of
//! rejecting the request. Outbound types ([`Itinerary`] and its parts) are
//! strict and always serialize in the shape the frontend expects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{string_list, stringify};

/// Body of `POST /api/ai/concierge`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConciergeRequest {
    pub booking: Booking,
    pub preferences: Preferences,
    pub nlu_query: String,
}

impl ConciergeRequest {
    /// Decode a raw request body, tolerating anything that is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!(error = %e, body_len = body.len(), "request.decode.invalid_json");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            booking: obj.get("booking").map(Booking::from_value).unwrap_or_default(),
            preferences: obj
                .get("preferences")
                .map(Preferences::from_value)
                .unwrap_or_default(),
            nlu_query: obj.get("nlu_query").map(stringify).unwrap_or_default(),
        }
    }
}

/// Trip booking supplied by the caller. Dates are not required to be well-formed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    /// Remaining caller fields, echoed into the prompt.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let mut extra = obj.clone();
        let mut take = |key: &str| extra.remove(key).map(|v| stringify(&v)).unwrap_or_default();
        let location = take("location");
        let start_date = take("start_date");
        let end_date = take("end_date");
        Self {
            location,
            start_date,
            end_date,
            extra,
        }
    }
}

/// Traveler preferences. Only the dietary tags are inspected by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Preferences {
    /// `dietary` may arrive as a single string or a list; both become a list.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let mut extra = obj.clone();
        let dietary = extra
            .remove("dietary")
            .map(|v| string_list(&v))
            .unwrap_or_default();
        Self { dietary, extra }
    }
}

/// One normalized row from the search-context collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    #[default]
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Upscale,
}

impl PriceTier {
    /// Accepts exactly `$`, `$$` or `$$$` (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "$" => Some(PriceTier::Budget),
            "$$" => Some(PriceTier::Moderate),
            "$$$" => Some(PriceTier::Upscale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Upscale => "$$$",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub address: String,
    pub price_tier: PriceTier,
    pub duration_min: u32,
    pub tags: Vec<String>,
    pub wheelchair_friendly: bool,
    pub child_friendly: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub price_tier: PriceTier,
    pub diet_tags: Vec<String>,
    pub notes: String,
}

/// Morning/afternoon/evening slots of a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocks {
    pub morning: Vec<String>,
    pub afternoon: Vec<String>,
    pub evening: Vec<String>,
}

impl Blocks {
    pub fn all_filled(&self) -> bool {
        !self.morning.is_empty() && !self.afternoon.is_empty() && !self.evening.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: String,
    pub blocks: Blocks,
}

/// The output contract returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub plan: Vec<DayPlan>,
    pub activities: Vec<Activity>,
    pub restaurants: Vec<Restaurant>,
    pub packing_checklist: Vec<String>,
}
