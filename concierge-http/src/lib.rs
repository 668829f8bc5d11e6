//! Small JSON-over-HTTP client shared by the generation and search collaborators.
//!
//! - One attempt per call, bounded by a per-client or per-request timeout
//! - Optional bearer credential; logs only say whether one was sent
//! - Optional *raw* request/response logging via `CONCIERGE_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), concierge_http::HttpError> {
//! let client = concierge_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", concierge_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "CONCIERGE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// Status code for API errors, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout(_))
    }
}

/// Per-request overrides.
///
/// ```
/// use concierge_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     bearer: Some("tvly-demo"),
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 5);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    /// Sent as `Authorization: Bearer <token>` after trimming quotes and whitespace.
    pub bearer: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use concierge_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://127.0.0.1:11434")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(&with_trailing_slash(base)).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Base URL every relative path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.send_json::<(), T>(Method::GET, path, None, opts).await
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, Some(body), opts).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let request_body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = opts.bearer {
            let token = sanitize_api_key(token)?;
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        if request_body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = request_tag();
        tracing::debug!(
            req_id = %req_id,
            method = %method,
            host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms = timeout.as_millis() as u64,
            bearer = opts.bearer.is_some(),
            has_body = request_body.is_some(),
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &url, &headers, request_body.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let mut rb = self
            .inner
            .request(method, url)
            .timeout(timeout)
            .headers(headers);
        if let Some(bytes) = request_body {
            rb = rb.body(bytes);
        }

        let started = Instant::now();
        let (status, resp_headers, bytes) = match rb.send().await {
            Ok(resp) => {
                let status = resp.status();
                let resp_headers = resp.headers().clone();
                let bytes = resp.bytes().await.map_err(|e| transport_error(e, timeout))?;
                (status, resp_headers, bytes)
            }
            Err(err) => {
                let failure = transport_error(err, timeout);
                tracing::warn!(req_id = %req_id, error = %failure, "http.network_error");
                return Err(failure);
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        let request_id = resp_headers
            .get("x-request-id")
            .or_else(|| resp_headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let snippet = snip_body(&bytes);
        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms,
            body_len = bytes.len(),
            x_request_id = %request_id,
            "http.response"
        );
        if raw_enabled() {
            let text = String::from_utf8_lossy(&bytes);
            tracing::info!(
                target: "http.raw",
                %req_id,
                %status,
                duration_ms,
                body = %truncate_chars(&text, RAW_MAX_BODY),
                "response"
            );
        }

        if !status.is_success() {
            let message = extract_error_message(&bytes);
            tracing::warn!(
                req_id = %req_id,
                %status,
                message = %message,
                x_request_id = %request_id,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            tracing::warn!(
                req_id = %req_id,
                serde_line = e.line(),
                serde_col = e.column(),
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(timeout)
    } else {
        HttpError::Network(err.to_string())
    }
}

fn request_tag() -> String {
    format!(
        "r{:x}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    )
}

/// Best-effort curl command for reproducing a request. The credential is masked.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, value) in headers {
        let shown = if *name == AUTHORIZATION {
            "Bearer <redacted>"
        } else {
            value.to_str().unwrap_or("")
        };
        parts.push(format!("-H '{}: {}'", name.as_str(), shown.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        let text = truncate_chars(&String::from_utf8_lossy(bytes), RAW_MAX_BODY);
        parts.push(format!("-d '{}'", text.replace('\'', r"'\''")));
    }
    parts.push(format!("'{url}'"));
    parts.join(" ")
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

/// Pull a human-readable message out of an error body.
fn extract_error_message(body: &[u8]) -> String {
    // {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct Nested {
        error: NestedDetail,
    }
    #[derive(Deserialize)]
    struct NestedDetail {
        message: String,
    }

    // {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Nested>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Flat>(body) {
        if let Some(found) = [m.message, m.detail, m.error].into_iter().find(|s| !s.is_empty()) {
            return found;
        }
    }
    snip_body(body)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn snip_body(body: &[u8]) -> String {
    truncate_chars(&String::from_utf8_lossy(body), SNIPPET_MAX)
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build("API key contains control characters".into()));
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_quoted_keys_with_whitespace() {
        let key = sanitize_api_key("  \"tvly-abc\n123\"  ").unwrap();
        assert_eq!(key, "tvly-abc123");
    }

    #[test]
    fn rejects_non_ascii_keys() {
        assert!(matches!(sanitize_api_key("clé"), Err(HttpError::Build(_))));
    }

    #[test]
    fn error_message_prefers_nested_shape() {
        let body = br#"{"error":{"message":"model not found"}}"#;
        assert_eq!(extract_error_message(body), "model not found");

        let body = br#"{"detail":"Unauthorized: missing or invalid API key."}"#;
        assert_eq!(
            extract_error_message(body),
            "Unauthorized: missing or invalid API key."
        );

        assert_eq!(extract_error_message(b"plain failure"), "plain failure");
    }

    #[test]
    fn snippets_truncate_on_char_boundaries() {
        let long = "é".repeat(SNIPPET_MAX + 10);
        let snip = snip_body(long.as_bytes());
        assert!(snip.ends_with("..."));
        assert_eq!(snip.chars().count(), SNIPPET_MAX + 3);
    }

    #[test]
    fn curl_rendering_masks_the_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tvly-secret"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let url = Url::parse("https://api.tavily.com/search").unwrap();
        let curl = make_curl(&Method::POST, &url, &headers, Some(br#"{"query":"x"}"#));
        assert!(!curl.contains("tvly-secret"));
        assert!(curl.contains("Bearer <redacted>"));
        assert!(curl.contains("content-type: application/json"));
        assert!(curl.ends_with("'https://api.tavily.com/search'"));
    }

    #[test]
    fn base_url_gains_trailing_slash_so_paths_join() {
        let client = HttpClient::new("http://127.0.0.1:11434").unwrap();
        let joined = client.base_url().join("api/generate").unwrap();
        assert_eq!(joined.as_str(), "http://127.0.0.1:11434/api/generate");
    }
}
