//! JSON-only instruction text for the generator.

use serde::Serialize;
use serde_json::json;

use crate::model::{ConciergeRequest, SearchResult};

/// Local search context beyond this many characters is cut off.
pub const SEARCH_CONTEXT_MAX_CHARS: usize = 1200;
const TRUNCATION_MARKER: &str = "...(truncated)";

const INSTRUCTIONS: &str = r#"You are an expert AI travel planner.
Return ONLY valid JSON (no commentary, no markdown, no code fences).

JSON Schema:
{
  "plan": [{"date":"YYYY-MM-DD","blocks":{"morning":[str],"afternoon":[str],"evening":[str]}}],
  "activities": [{"title":str,"address":str,"price_tier":"$|$$|$$$","duration_min":int,"tags":[str],"wheelchair_friendly":bool,"child_friendly":bool}],
  "restaurants": [{"name":str,"address":str,"price_tier":"$|$$|$$$","diet_tags":[str],"notes":str}],
  "packing_checklist": [str]
}

Hard requirements:
- Output strictly valid JSON, with all four top-level keys.
- Produce at least 2 days in "plan" with morning/afternoon/evening arrays.
- Produce at least 3 "activities" and at least 3 "restaurants".
- Do NOT output aggregator/directory/listicle items (e.g., Yelp, Tripadvisor, Reddit, YouTube).
- Prefer concrete places with a name and an address/URL of the place itself (not a directory page).
- Respect dietary/mobility preferences.
"#;

/// Search query sent to the context collaborator for a booking location.
pub fn search_query(location: &str) -> String {
    format!("{} restaurants family activities", location.trim())
}

/// Assemble the generator prompt for one request.
///
/// ```
/// use concierge_core::model::ConciergeRequest;
/// use concierge_core::prompt::build_prompt;
///
/// let request = ConciergeRequest::default();
/// let prompt = build_prompt(&request, &[]);
/// assert!(prompt.contains("Return ONLY valid JSON"));
/// assert!(prompt.contains(r#"Local results: {"results":[]}"#));
/// ```
pub fn build_prompt(request: &ConciergeRequest, results: &[SearchResult]) -> String {
    let local = search_context(results);
    format!(
        "{INSTRUCTIONS}\nBooking: {}\nPreferences: {}\nFree text: {}\nLocal results: {}\n",
        to_json(&request.booking),
        to_json(&request.preferences),
        request.nlu_query,
        local,
    )
}

fn search_context(results: &[SearchResult]) -> String {
    let serialized = json!({ "results": results }).to_string();
    match serialized.char_indices().nth(SEARCH_CONTEXT_MAX_CHARS) {
        Some((idx, _)) => format!("{}{TRUNCATION_MARKER}", &serialized[..idx]),
        None => serialized,
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
