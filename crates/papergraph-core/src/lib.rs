//! Papergraph Core - shared infrastructure for the papergraph crates
//!
//! HTTP plumbing for the ingestion clients, rate-limit retry, logging,
//! progress bars and the shutdown flag.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use http::{
    HttpConfig, HttpError, NoopRecorder, RequestRecord, RequestRecorder, RequestSource,
    SHARED_RUNTIME, TextResponse, get_text, http_client, http_config, set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_mib, fmt_num};
pub use retry::{RetryPolicy, retry_rate_limited};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};
