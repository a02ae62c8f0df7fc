//! # Dispatch K8s
//!
//! Kubernetes-facing half of the dispatch subsystem: reconciling
//! `kubeai.org/v1, Model` custom resources and loading the builtin model
//! templates the reconciler patches.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   dispatch-k8s                        │
//! ├─────────────────────────────────────────────────────┤
//! │  ┌───────────────────┐   ┌───────────────────────┐  │
//! │  │ template            │   │ reconciler             │  │
//! │  │ load_builtin_       │ → │ Reconciler::apply()    │  │
//! │  │ template()          │   │                        │  │
//! │  └───────────────────┘   └───────────────────────┘  │
//! └─────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod reconciler;
pub mod template;

pub use reconciler::{Reconciler, Reconciling};
pub use template::{load_builtin_template, BUILTIN_MODELS};

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// K8s-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reconciler's list/create/patch call failed.
    #[error("reconciliation failed: {0}")]
    ReconciliationFailed(String),

    /// A builtin template file could not be read.
    #[error("failed to load template {0}: {1}")]
    TemplateLoad(String, String),

    /// A failure surfaced directly by `dispatch-types` (CR parsing).
    #[error(transparent)]
    Types(#[from] dispatch_types::Error),
}

impl From<Error> for dispatch_types::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::ReconciliationFailed(r) => dispatch_types::Error::ReconciliationFailed(r),
            Error::TemplateLoad(path, reason) => {
                dispatch_types::Error::Io(std::io::Error::other(format!("{path}: {reason}")))
            }
            Error::Types(e) => e,
        }
    }
}
