//! # Dispatch Planner
//!
//! Turns raw telemetry into a scheduling decision: build an inventory,
//! bin-pack a Selection, synthesize a KubeAI resource profile.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      dispatch-planner                          │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌──────────────┐   ┌─────────────────────┐ │
//! │  │ inventory    │ → │ planner      │ → │ synthesizer         │ │
//! │  │ build_       │   │ select()     │   │ synthesize()        │ │
//! │  │ inventory()  │   │              │   │                     │ │
//! │  └─────────────┘   └──────────────┘   └─────────────────────┘ │
//! └───────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod inventory;
pub mod planner;
pub mod synthesizer;

pub use inventory::build_inventory;
pub use planner::select;
pub use synthesizer::synthesize;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Planner-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A GPU in a telemetry bundle is missing one of the five metrics.
    #[error("telemetry incomplete for {node}/cuda:{cuda_index}: missing {metric}")]
    Incomplete {
        /// Node the incomplete GPU was observed on.
        node: String,
        /// cuda index of the incomplete GPU.
        cuda_index: u32,
        /// Name of the missing metric.
        metric: String,
    },

    /// A failure surfaced directly by `dispatch-types` (e.g. a duplicate
    /// cuda index, or a heterogeneous-selection rejection).
    #[error(transparent)]
    Types(#[from] dispatch_types::Error),
}

impl Error {
    /// Build an [`Error::Incomplete`] for a missing metric field.
    pub fn incomplete(node: impl Into<String>, cuda_index: u32, metric: impl Into<String>) -> Self {
        Error::Incomplete {
            node: node.into(),
            cuda_index,
            metric: metric.into(),
        }
    }
}

impl From<Error> for dispatch_types::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Incomplete {
                node,
                cuda_index,
                metric,
            } => dispatch_types::Error::TelemetryIncomplete {
                node,
                cuda_index,
                metric,
            },
            Error::Types(e) => e,
        }
    }
}
