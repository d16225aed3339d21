//! Minimal JSON HTTP client with safe logging.
//!
//! - One request per call: no retries, no backoff
//! - Per-request timeout and extra headers via [`RequestOpts`]
//! - Authorization-like headers are redacted before anything is logged
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), autoapply_http::HttpError> {
//! let client = autoapply_http::HttpClient::new()?;
//! let delivery = client
//!     .post_json(
//!         "https://hooks.example.com/run",
//!         &serde_json::json!({"ok": true}),
//!         autoapply_http::RequestOpts::default(),
//!     )
//!     .await?;
//! assert!(delivery.status.is_success());
//! # Ok(()) }
//! ```
//!
//! Observability: `tracing` events `http.request.start`, `http.response` and
//! `http.error` carry a per-request id, the host/path, status, duration and a
//! truncated body snippet.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

const SNIPPET_MAX: usize = 500;
const SECRET_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie", "x-api-key"];

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs.
///
/// ```
/// use autoapply_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
}

/// What the server answered to a successful request.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub status: StatusCode,
    pub request_id: String,
    pub body_snippet: String,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client with a 5 s connect timeout.
    ///
    /// ```no_run
    /// use autoapply_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(10));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: Duration::from_secs(10),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// POST `body` as JSON to an absolute `url`. Non-2xx responses are errors.
    pub async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        opts: RequestOpts,
    ) -> Result<Delivery, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = Url::parse(url).map_err(|e| HttpError::Url(e.to_string()))?;
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.send(Method::POST, url, Some(bytes), opts).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        opts: RequestOpts,
    ) -> Result<Delivery, HttpError> {
        let req_id = format!("r{}", Uuid::new_v4().simple());
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());

        let mut rb = self
            .inner
            .request(method.clone(), url)
            .timeout(timeout);
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }
        let body_len = body.as_ref().map_or(0, Vec::len);
        if let Some(bytes) = body {
            rb = rb.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        tracing::debug!(
            req_id = %req_id,
            method = %method,
            host_path = %host_path,
            headers = ?opts.headers.as_ref().map(redact_headers).unwrap_or_default(),
            timeout_ms = timeout.as_millis() as u64,
            body_len,
            "http.request.start"
        );

        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id = %req_id, host_path = %host_path, message = %err, "http.network_error.send");
            HttpError::Network(err.to_string())
        })?;
        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .or_else(|| resp.headers().get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or(req_id.as_str())
            .to_string();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id = %req_id, message = %err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let snippet = snip_body(&bytes);

        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms = t0.elapsed().as_millis() as u64,
            body_len = bytes.len(),
            x_request_id = %request_id,
            "http.response"
        );

        if status.is_success() {
            return Ok(Delivery {
                status,
                request_id,
                body_snippet: snippet,
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id = %req_id,
            %status,
            message = %message,
            x_request_id = %request_id,
            body_snippet = %snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

/// Redact sensitive headers for logging.
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if SECRET_HEADERS.iter().any(|s| key.eq_ignore_ascii_case(s)) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Pull a human-readable message out of common JSON error envelopes,
/// falling back to a body snippet.
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

    if let Ok(n) = serde_json::from_slice::<Nested>(body) {
        return n.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Flat>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
