//! # Dispatch Orchestrator
//!
//! Wires every other dispatch crate into the per-request pipeline: auth
//! bootstrap, request validation, descriptor resolution, VRAM estimation,
//! inventory, bin-packing, profile synthesis, CR reconciliation, and
//! streaming chat. Also hosts the fan-out concurrency harness for running
//! many requests at once.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     dispatch-orchestrator                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  config → auth → validate → orchestrator::Orchestrator::dispatch │
//! │                                        │                         │
//! │                                        ▼                         │
//! │                                   fanout::fan_out                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod fanout;
pub mod orchestrator;
pub mod validate;

pub use config::OrchestratorConfig;
pub use fanout::{fan_out, OrchestratorOutcome, Sink};
pub use orchestrator::{InferenceRequest, Orchestrator};

/// Result type alias for this crate. The orchestrator has no error variants
/// of its own — every failure originates in a downstream crate and already
/// carries a `dispatch_types::Error` conversion, so this crate reuses that
/// single taxonomy directly rather than wrapping it again.
pub type Result<T> = std::result::Result<T, dispatch_types::Error>;
