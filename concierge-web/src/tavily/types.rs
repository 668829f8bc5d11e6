use concierge_core::SearchResult;
use serde::Serialize;
use serde_json::Value;

/// Request body for the Tavily `/search` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TavilySearchRequest<'a> {
    pub query: &'a str,
    pub max_results: u32,
}

/// Flatten a Tavily response into `{title, url, content}` rows.
///
/// Rows come from `results`, or `data` when `results` is absent or empty;
/// content falls back from `content` to `snippet` to `description`.
/// Non-object rows are skipped.
///
/// ```
/// use concierge_web::tavily::normalize;
/// use serde_json::json;
///
/// let rows = normalize(&json!({
///     "results": [{"title": "Heard Museum", "url": "https://heard.org", "snippet": "Art"}]
/// }));
/// assert_eq!(rows[0].content, "Art");
/// ```
pub fn normalize(resp: &Value) -> Vec<SearchResult> {
    let rows = ["results", "data"]
        .iter()
        .filter_map(|key| resp.get(key).and_then(Value::as_array))
        .find(|rows| !rows.is_empty());
    let Some(rows) = rows else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(Value::as_object)
        .map(|row| {
            let text = |key: &str| row.get(key).map(stringify).unwrap_or_default();
            let content = ["content", "snippet", "description"]
                .iter()
                .map(|key| text(key))
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            SearchResult {
                title: text("title"),
                url: text("url"),
                content,
            }
        })
        .collect()
}

fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn results_take_precedence_over_data() {
        let rows = normalize(&json!({
            "results": [{"title": "A", "url": "https://a.org", "content": "alpha"}],
            "data": [{"title": "B"}]
        }));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "A");
        assert_eq!(rows[0].content, "alpha");
    }

    #[test]
    fn data_is_used_when_results_are_missing_or_empty() {
        let rows = normalize(&json!({"results": [], "data": [{"title": "B", "description": "beta"}]}));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "beta");
        assert_eq!(rows[0].url, "");
    }

    #[test]
    fn odd_rows_and_fields_are_tolerated() {
        let rows = normalize(&json!({
            "results": [
                "not a row",
                {"title": null, "url": 42, "content": "", "snippet": "fallback snippet"}
            ]
        }));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[0].url, "42");
        assert_eq!(rows[0].content, "fallback snippet");
    }

    #[test]
    fn unexpected_shapes_yield_nothing() {
        assert!(normalize(&json!({"answer": "no rows"})).is_empty());
        assert!(normalize(&json!([1, 2, 3])).is_empty());
    }
}
