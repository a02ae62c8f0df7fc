//! The resolved shape of a catalog model: parameter count and quantization.

use serde::{Deserialize, Serialize};

/// A model resolved from the catalog, ready for VRAM estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Catalog key, e.g. `gemma2:9b`.
    pub name: String,
    /// Parameter count, in billions (e.g. `9.0`, `2.7`, `0.5` for `500M`).
    pub parameter_size_billion: f64,
    /// Quantization bit-width, e.g. `4` for `Q4_K_M`.
    pub quantization_bits: u32,
}

impl ModelDescriptor {
    /// Build a descriptor, asserting the contract the estimator relies on:
    /// a positive parameter count and a quantization width in `1..=32`.
    /// Violating this is a programming bug in the caller, not a runtime
    /// error (§7): catalog responses are validated before this is called.
    pub fn new(name: impl Into<String>, parameter_size_billion: f64, quantization_bits: u32) -> Self {
        debug_assert!(parameter_size_billion > 0.0, "parameter size must be positive");
        debug_assert!(
            (1..=32).contains(&quantization_bits),
            "quantization bits must be in 1..=32"
        );
        Self {
            name: name.into(),
            parameter_size_billion,
            quantization_bits,
        }
    }
}
