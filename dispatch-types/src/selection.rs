//! The output of the Dispatch Planner and its KubeAI-facing encoding.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A minimal set of GPUs on one node that together cover a VRAM requirement.
///
/// Invariant: `total_free_mib >= required_mib`, no GPU identity repeats, and
/// every GPU named belongs to `node_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Node the selected GPUs live on.
    pub node_name: String,
    /// Selected GPU identities (`cuda:<i>`), in the order they were picked.
    pub gpus: Vec<String>,
    /// Sum of free memory across the selected GPUs, MiB.
    pub total_free_mib: u64,
    /// The VRAM requirement this selection was built to satisfy.
    pub required_mib: u64,
}

impl Selection {
    /// Number of GPUs in the selection.
    pub fn gpu_count(&self) -> usize {
        self.gpus.len()
    }
}

/// A validated `nvidia-gpu-<model-token>-<vram>gb:<count>` token recognized
/// by KubeAI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceProfile(String);

impl ResourceProfile {
    /// Build a profile token, validating the model token and GiB class are
    /// non-empty and the count is non-zero.
    pub fn new(model_token: &str, vram_gib: u32, count: usize) -> Result<Self> {
        if model_token.is_empty() {
            return Err(Error::UnsupportedGpuModel("empty model token".into()));
        }
        if count == 0 {
            return Err(Error::NoAvailableGpu);
        }
        Ok(Self(format!("nvidia-gpu-{model_token}-{vram_gib}gb:{count}")))
    }

    /// The raw profile token string, as written into `spec.resourceProfile`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_expected_token() {
        let profile = ResourceProfile::new("4090", 24, 1).unwrap();
        assert_eq!(profile.as_str(), "nvidia-gpu-4090-24gb:1");
    }

    #[test]
    fn rejects_zero_count() {
        assert!(ResourceProfile::new("4090", 24, 0).is_err());
    }
}
