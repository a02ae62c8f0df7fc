//! # Dispatch Clients
//!
//! External HTTP adapters for the GPU dispatch subsystem.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    dispatch-clients                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────┐ ┌────────────────┐ ┌────────────────┐│
//! │  │ prometheus         │ │ ollama         │ │ openai         ││
//! │  │ TelemetrySource     │ │ CatalogSource  │ │ OpenAiClient   ││
//! │  │ PrometheusClient    │ │ OllamaClient   │ │ auth + stream  ││
//! │  └───────────────────┘ └────────────────┘ └────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every client is built around a shared `reqwest::Client` (§5: HTTP
//! clients are constructed once and shared across tasks) and exposes a
//! narrow trait (`TelemetrySource`, `CatalogSource`) so the orchestrator's
//! tests can substitute a fake without a live server.

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;
pub mod prometheus;

pub use ollama::{CatalogSource, OllamaClient};
pub use openai::{ChatChunk, ChatSource, Credentials, OpenAiClient};
pub use prometheus::{PrometheusClient, PrometheusConfig, TelemetryBundle, TelemetrySource};

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Client-layer errors; each has a matching `dispatch_types::Error`
/// conversion so the orchestrator can surface them through the spec's
/// single status-code mapping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A PromQL query failed or its response was malformed.
    #[error("telemetry query {query} failed: {reason}")]
    TelemetryQuery {
        /// Metric name that failed.
        query: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// The catalog lookup failed (model absent, or a parse error from
    /// `dispatch-estimator`).
    #[error("catalog lookup failed for {model}: {reason}")]
    CatalogLookup {
        /// Catalog key that failed to resolve.
        model: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// Runtime is not implemented by this catalog adapter (only `ollama`
    /// is; `vllm` always fails this way per spec §4.3).
    #[error("unsupported runtime: {0}")]
    UnsupportedRuntime(String),

    /// Auth bootstrap (signin or api-key exchange) failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// The chat stream failed mid-flight.
    #[error("stream failed: {0}")]
    StreamFailed(String),

    /// Any other HTTP failure, carrying the upstream status when known.
    #[error("network error ({1:?}): {0}")]
    Network(String, Option<u16>),
}

impl From<Error> for dispatch_types::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::TelemetryQuery { query, reason } => {
                dispatch_types::Error::TelemetryQueryFailed { query, reason }
            }
            Error::CatalogLookup { model, reason } => {
                dispatch_types::Error::CatalogLookupFailed { model, reason }
            }
            Error::UnsupportedRuntime(r) => dispatch_types::Error::UnsupportedRuntime(r),
            Error::AuthFailed(r) => dispatch_types::Error::AuthFailed(r),
            Error::StreamFailed(r) => dispatch_types::Error::StreamFailed(r),
            Error::Network(reason, status) => dispatch_types::Error::NetworkError(reason, status),
        }
    }
}
