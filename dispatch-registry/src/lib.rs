//! # Dispatch Registry
//!
//! Static registry loading for the GPU dispatch subsystem: the GPU model →
//! VRAM class table (`gpu_models.yaml`) and the per-runtime model allow-list
//! (`supported-model.yaml`). Both are loaded once at process startup and
//! held read-only for the process lifetime.

#![warn(missing_docs)]

pub mod allow_list;
pub mod gpu_models;

pub use allow_list::AllowList;
pub use gpu_models::GpuRegistry;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Registry loading errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A registry file could not be read or parsed.
    #[error("failed to load registry from {0}: {1}")]
    RegistryLoad(String, String),
}

impl From<Error> for dispatch_types::Error {
    fn from(err: Error) -> Self {
        dispatch_types::Error::Io(std::io::Error::other(err.to_string()))
    }
}
