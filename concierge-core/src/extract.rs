//! Recovery of a JSON object from free-form generator output.
//!
//! Well-behaved generators return pure JSON; the rest wrap it in
//! commentary, code fences or trailing notes. Recovery is segmentation plus
//! strict parsing: no bracket repair and no trailing-comma tolerance.

use serde_json::{Map, Value};

/// Best-effort extraction of the JSON object embedded in `text`.
///
/// The whole document is tried first. Otherwise every maximal balanced
/// `{...}` span is collected in one left-to-right pass and the spans are
/// parsed latest-first, since commentary tends to precede the payload.
///
/// ```
/// use concierge_core::extract::extract_json_object;
///
/// let raw = r#"Sure! Here is your plan: {"plan": []} Let me know!"#;
/// let obj = extract_json_object(raw).unwrap();
/// assert!(obj.contains_key("plan"));
/// assert!(extract_json_object("no braces here").is_none());
/// ```
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        return Some(obj);
    }

    let fragments = balanced_fragments(text);
    tracing::debug!(
        text_len = text.len(),
        fragments = fragments.len(),
        "extract.fragments"
    );
    fragments
        .into_iter()
        .rev()
        .find_map(|fragment| match serde_json::from_str::<Value>(fragment) {
            Ok(Value::Object(obj)) => Some(obj),
            _ => None,
        })
}

/// Top-level balanced brace spans, in order of discovery.
///
/// Unmatched closing braces are ignored; an opening brace that never closes
/// swallows the rest of the text and yields no span.
fn balanced_fragments(text: &str) -> Vec<&str> {
    let mut stack: Vec<usize> = Vec::new();
    let mut fragments = Vec::new();
    for (idx, ch) in text.char_indices() {
        match ch {
            '{' => stack.push(idx),
            '}' => {
                if let Some(open) = stack.pop() {
                    if stack.is_empty() {
                        fragments.push(&text[open..=idx]);
                    }
                }
            }
            _ => {}
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pure_json_is_returned_unchanged() {
        let doc = json!({
            "plan": [{"date": "2024-03-01", "blocks": {"morning": ["Hike"]}}],
            "activities": [],
            "nested": {"deep": {"value": [1, 2, 3]}}
        });
        let text = serde_json::to_string_pretty(&doc).unwrap();
        let got = extract_json_object(&text).unwrap();
        assert_eq!(Value::Object(got), doc);
    }

    #[test]
    fn embedded_json_survives_stray_braces_in_prose() {
        let payload = json!({"activities": [{"title": "Desert Botanical Garden"}]});
        let text = format!(
            "Note: }} stray closers }} are ignored.\n```json\n{}\n```\nTrailing {{ never closes",
            payload
        );
        let got = extract_json_object(&text).unwrap();
        assert_eq!(Value::Object(got), payload);
    }

    #[test]
    fn later_object_wins_over_earlier_one() {
        let text = r#"Draft: {"version": 1} Final answer: {"version": 2}"#;
        let got = extract_json_object(text).unwrap();
        assert_eq!(got.get("version"), Some(&json!(2)));
    }

    #[test]
    fn unparseable_later_fragment_falls_back_to_earlier() {
        let text = r#"{"version": 1} and then {oops, not json}"#;
        let got = extract_json_object(text).unwrap();
        assert_eq!(got.get("version"), Some(&json!(1)));
    }

    #[test]
    fn no_recovery_for_truncated_or_lenient_json() {
        assert!(extract_json_object(r#"{"plan": [1, 2"#).is_none());
        assert!(extract_json_object(r#"Here: {"a": 1,}"#).is_none());
        assert!(extract_json_object("").is_none());
        assert!(extract_json_object("   ").is_none());
    }

    #[test]
    fn top_level_array_falls_through_to_fragment_scan() {
        let got = extract_json_object(r#"[{"a": 1}, {"b": 2}]"#).unwrap();
        assert_eq!(got.get("b"), Some(&json!(2)));
    }

    #[test]
    fn fragments_are_maximal_top_level_spans() {
        let text = "x {a {b} c} y {d} z";
        assert_eq!(balanced_fragments(text), vec!["{a {b} c}", "{d}"]);
    }

    #[test]
    fn multibyte_prose_does_not_break_slicing() {
        let text = "Voilà — votre itinéraire ✈️ {\"ok\": true} ✓";
        let got = extract_json_object(text).unwrap();
        assert_eq!(got.get("ok"), Some(&json!(true)));
    }
}
