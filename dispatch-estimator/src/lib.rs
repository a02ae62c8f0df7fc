//! # Dispatch Estimator
//!
//! Pure VRAM estimation for LLM inference, plus the catalog string parsers
//! it's built on. Nothing in this crate performs I/O or suspends.
//!
//! ## Formula
//!
//! ```text
//! mib = ceil( (P_billion * 4 / (32 / Q_bits)) * 1.2 * 1024 )
//! ```
//!
//! Weights at 32-bit occupy `4*P` bytes per billion parameters;
//! quantization scales that by `Q/32`; the `1.2` factor reserves 20%
//! headroom for activations and KV-cache; `1024` converts the GiB-valued
//! formula to MiB.

#![warn(missing_docs)]

pub mod parse;

pub use parse::{parse_parameter_size, parse_quant_bits};

use dispatch_types::ModelDescriptor;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from parsing catalog-reported strings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `parameter_size` did not match `^(\d+(?:\.\d+)?)([KMB])`.
    #[error("invalid parameter size: {0}")]
    InvalidParameterSize(String),
    /// `quantization_level` contained no embedded integer.
    #[error("invalid quantization level: {0}")]
    InvalidQuantization(String),
}

impl From<Error> for dispatch_types::Error {
    fn from(err: Error) -> Self {
        dispatch_types::Error::CatalogLookupFailed {
            model: String::new(),
            reason: err.to_string(),
        }
    }
}

/// Estimate the VRAM required to serve `descriptor`, in MiB.
///
/// Pure and total given `parameter_size_billion > 0.0` and
/// `quantization_bits` in `1..=32` — violating either is a programming bug
/// per the descriptor's own construction contract, not a runtime error.
pub fn estimate_vram_mib(descriptor: &ModelDescriptor) -> u64 {
    let p = descriptor.parameter_size_billion;
    let q = descriptor.quantization_bits as f64;

    let gib = (p * 4.0 / (32.0 / q)) * 1.2;
    (gib * 1024.0).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(p: f64, q: u32) -> ModelDescriptor {
        ModelDescriptor::new("test-model", p, q)
    }

    #[test]
    fn scenario_single_gpu_fit_gemma2_9b_q4() {
        // spec §8 scenario 1: 9B params, Q4 → ~5530 MiB
        let estimate = estimate_vram_mib(&descriptor(9.0, 4));
        assert_eq!(estimate, 5530);
    }

    #[test]
    fn scenario_no_fit_70b_q4() {
        // spec §8 scenario 3: 70B params, Q4 → ~43008 MiB
        let estimate = estimate_vram_mib(&descriptor(70.0, 4));
        assert_eq!(estimate, 43008);
    }

    #[test]
    fn monotone_in_parameter_size() {
        let low = estimate_vram_mib(&descriptor(4.0, 8));
        let high = estimate_vram_mib(&descriptor(8.0, 8));
        assert!(high >= low);
    }

    #[test]
    fn monotone_in_quantization_bits() {
        let low = estimate_vram_mib(&descriptor(9.0, 4));
        let high = estimate_vram_mib(&descriptor(9.0, 8));
        assert!(high >= low);
    }
}
