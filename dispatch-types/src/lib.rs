//! # Dispatch Types
//!
//! Shared data model and error taxonomy for the GPU dispatch subsystem.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     dispatch-types                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐ ┌────────────┐ ┌───────────┐ ┌─────────────┐ │
//! │  │ gpu        │ │ model      │ │ registry  │ │ selection   │ │
//! │  │ Gpu        │ │ Model      │ │ GpuModel  │ │ Selection   │ │
//! │  │ GpuNode    │ │ Descriptor │ │ Entry     │ │ Resource    │ │
//! │  │ Inventory  │ │            │ │           │ │ Profile     │ │
//! │  │ Snapshot   │ │            │ │           │ │             │ │
//! │  └───────────┘ └────────────┘ └───────────┘ └─────────────┘ │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │ cr::ModelCrSpec — opaque KubeAI Model CR accessor      │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every other dispatch crate depends on this one; it has no dependency on
//! any of them and performs no I/O.

#![warn(missing_docs)]

pub mod cr;
pub mod gpu;
pub mod model;
pub mod registry;
pub mod selection;

pub use cr::ModelCrSpec;
pub use gpu::{Gpu, GpuNode, InventorySnapshot};
pub use model::ModelDescriptor;
pub use registry::GpuModelEntry;
pub use selection::{ResourceProfile, Selection};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias used throughout the dispatch subsystem.
pub type Result<T> = std::result::Result<T, Error>;

/// The full dispatch error taxonomy (spec §7). Each downstream crate maps
/// its own failures into one of these variants so the orchestrator has a
/// single type to turn into an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request failed validation (bad model/runtime/prompt). Surfaces as 400.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Model name is not in the configured allow-list. Surfaces as 400.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// Runtime is not `ollama` or `vllm`, or is `vllm` (not implemented).
    /// Surfaces as 400.
    #[error("unsupported runtime: {0}")]
    UnsupportedRuntime(String),

    /// A Selection's GPU display name has no registry entry, or a non-RTX
    /// name was given to the synthesizer. Surfaces as 500.
    #[error("unsupported GPU model: {0}")]
    UnsupportedGpuModel(String),

    /// A Selection spans more than one distinct GPU display name (§9 GPU
    /// homogeneity decision). Surfaces as 500.
    #[error("selection spans heterogeneous GPU models: {0:?}")]
    HeterogeneousSelection(Vec<String>),

    /// Two GPUs on one node reported the same cuda index.
    #[error("duplicate cuda index {cuda_index} on node {node}")]
    DuplicateGpuIndex {
        /// Node the duplicate was observed on.
        node: String,
        /// The repeated cuda index.
        cuda_index: u32,
    },

    /// A GPU in the inventory is missing one or more of the five telemetry
    /// metrics after a snapshot build. Surfaces as 500, retriable.
    #[error("telemetry incomplete for {node}/cuda:{cuda_index}: missing {metric}")]
    TelemetryIncomplete {
        /// Node the incomplete GPU was observed on.
        node: String,
        /// cuda index of the incomplete GPU.
        cuda_index: u32,
        /// Name of the missing metric.
        metric: String,
    },

    /// One of the five concurrent Prometheus queries failed. Surfaces as
    /// 500, retriable.
    #[error("telemetry query {query} failed: {reason}")]
    TelemetryQueryFailed {
        /// PromQL metric name that failed.
        query: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// The model catalog lookup failed (not found, or the adapter's HTTP
    /// call failed). Surfaces as 500, retriable.
    #[error("catalog lookup failed for {model}: {reason}")]
    CatalogLookupFailed {
        /// Catalog key that failed to resolve.
        model: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// The planner could not find a node with enough free VRAM (or the
    /// VRAM requirement was unknown). Surfaces as 500, retriable when
    /// cluster load falls.
    #[error("no available GPU meets the VRAM requirement")]
    NoAvailableGpu,

    /// The CR Reconciler's create/patch call failed. Surfaces as 500.
    #[error("reconciliation failed: {0}")]
    ReconciliationFailed(String),

    /// The orchestrator's auth bootstrap failed. Fatal — the service is not
    /// operational until this succeeds.
    #[error("auth bootstrap failed: {0}")]
    AuthFailed(String),

    /// The chat stream failed mid-flight. Surfaces as 500; chunks already
    /// emitted to the caller remain delivered.
    #[error("stream failed: {0}")]
    StreamFailed(String),

    /// Any HTTP I/O failure not covered by a more specific variant above.
    /// The second field is the upstream HTTP status, when one was received.
    #[error("network error ({1:?}): {0}")]
    NetworkError(String, Option<u16>),

    /// A `ModelCrSpec` document was malformed or missing a required field.
    #[error("invalid Model CR: {0}")]
    InvalidModelCr(String),

    /// Wrapped I/O error (config/registry file loading).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The HTTP status this error should surface as (spec §7's table).
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_)
            | Error::UnsupportedModel(_)
            | Error::UnsupportedRuntime(_) => 400,
            Error::AuthFailed(_) => 503,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(Error::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(Error::UnsupportedModel("x".into()).status_code(), 400);
        assert_eq!(Error::UnsupportedRuntime("x".into()).status_code(), 400);
        assert_eq!(Error::NoAvailableGpu.status_code(), 500);
        assert_eq!(Error::ReconciliationFailed("x".into()).status_code(), 500);
        assert_eq!(Error::AuthFailed("x".into()).status_code(), 503);
    }
}
