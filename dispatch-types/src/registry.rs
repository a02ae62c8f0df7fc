//! Static GPU model registry entries.

use serde::{Deserialize, Serialize};

/// One row of the GPU model registry: a driver-reported display name mapped
/// to its VRAM class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuModelEntry {
    /// Exactly as reported by drivers, e.g. `NVIDIA GeForce RTX 4090`.
    #[serde(rename = "model")]
    pub display_name: String,
    /// VRAM class, GiB.
    #[serde(rename = "vram")]
    pub vram_gib: u32,
}
