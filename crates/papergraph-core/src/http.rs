//! Shared HTTP client, runtime, and error type for the ingestion clients.
//!
//! Requests are made with async reqwest on a shared tokio runtime but exposed
//! through a blocking interface, so the batch commands can stay sequential.

use std::sync::{LazyLock, OnceLock};
use std::time::{Duration, Instant};

/// Connect timeout for every outbound request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifies this tool to upstream APIs
pub const USER_AGENT: &str = concat!("papergraph/", env!("CARGO_PKG_VERSION"));

/// Error from an outbound HTTP call
#[derive(Debug)]
pub enum HttpError {
    /// Non-OK status, or a transport failure without a status
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Body could not be read or decoded
    Io(std::io::Error),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Error for a response that arrived with a non-success status
    pub fn from_status(status: u16, reason: &str) -> Self {
        Self::Http {
            status: Some(status),
            message: reason.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Io(_) => None,
        }
    }

    /// Upstream asked us to slow down (HTTP 429)
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

impl From<std::io::Error> for HttpError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Retry settings applied to rate-limited API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install process-wide HTTP settings. Only the first call takes effect.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("http config already set, ignoring {config:?}");
    }
}

/// Current process-wide HTTP settings (defaults if never set)
pub fn http_config() -> HttpConfig {
    HTTP_CONFIG.get().copied().unwrap_or_default()
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// A fully-read response. Non-OK statuses are returned, not raised,
/// so callers can decide whether to retry and can record the body.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub status: u16,
    pub reason: String,
    pub headers_json: String,
    pub body: String,
    pub elapsed: Duration,
}

impl TextResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-OK response into an [`HttpError`]
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::from_status(self.status, &self.reason))
        }
    }
}

/// Blocking GET with extra request headers.
pub fn get_text(url: &str, headers: &[(&str, &str)]) -> Result<TextResponse, HttpError> {
    SHARED_RUNTIME.handle().block_on(async {
        let start = Instant::now();
        let mut request = http_client().get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await.map_err(|e| HttpError::from_reqwest(&e))?;

        let status = response.status();
        let headers_json = headers_to_json(
            response
                .headers()
                .iter()
                .map(|(k, v)| (k.as_str(), v.to_str().unwrap_or("<binary>"))),
        );
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::from_reqwest(&e))?;

        Ok(TextResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers_json,
            body,
            elapsed: start.elapsed(),
        })
    })
}

/// Render headers as a flat JSON object for the request log.
fn headers_to_json<'a>(headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .into_iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Which upstream a request went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Arxiv,
    SemanticScholar,
}

impl RequestSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::SemanticScholar => "semantic-scholar",
        }
    }
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request, successful or not.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub source: RequestSource,
    pub url: String,
    pub method: &'static str,
    pub request_headers: Option<String>,
    pub status: Option<u16>,
    pub response_headers: Option<String>,
    pub response_body: Option<String>,
    pub duration: Duration,
    pub success: bool,
    pub error_message: Option<String>,
    /// Natural key of the paper the request was made for
    pub arxiv_id: Option<String>,
}

impl RequestRecord {
    /// Build a record from the outcome of [`get_text`]
    pub fn from_outcome(
        source: RequestSource,
        url: &str,
        arxiv_id: Option<&str>,
        outcome: &Result<TextResponse, HttpError>,
        started: Instant,
    ) -> Self {
        let base = Self {
            source,
            url: url.to_string(),
            method: "GET",
            request_headers: None,
            status: None,
            response_headers: None,
            response_body: None,
            duration: started.elapsed(),
            success: false,
            error_message: None,
            arxiv_id: arxiv_id.map(str::to_string),
        };
        match outcome {
            Ok(resp) => Self {
                status: Some(resp.status),
                response_headers: Some(resp.headers_json.clone()),
                response_body: Some(resp.body.clone()),
                duration: resp.elapsed,
                success: resp.is_success(),
                error_message: (!resp.is_success())
                    .then(|| format!("HTTP {} {}", resp.status, resp.reason)),
                ..base
            },
            Err(e) => Self {
                status: e.status(),
                error_message: Some(e.to_string()),
                ..base
            },
        }
    }

    pub fn with_request_headers(mut self, headers: &[(&str, &str)]) -> Self {
        self.request_headers = Some(headers_to_json(headers.iter().copied()));
        self
    }
}

/// Sink for outbound request records (e.g. a database table).
///
/// Recording is best-effort: implementations log their own failures
/// instead of failing the request that produced the record.
pub trait RequestRecorder {
    fn record(&self, record: &RequestRecord);
}

/// Recorder that drops everything
pub struct NoopRecorder;

impl RequestRecorder for NoopRecorder {
    fn record(&self, _record: &RequestRecord) {}
}
