//! `gpu_models.yaml` loading and lookup (spec §4.5, §6).

use std::collections::HashMap;
use std::path::Path;

use dispatch_types::GpuModelEntry;

use crate::{Error, Result};

/// In-memory GPU model registry, keyed by driver-reported display name.
/// Loaded once from `gpu_models.yaml`; read-only for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct GpuRegistry {
    entries: HashMap<String, GpuModelEntry>,
}

impl GpuRegistry {
    /// Build a registry from already-parsed entries.
    pub fn new(entries: Vec<GpuModelEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (e.display_name.clone(), e))
            .collect();
        Self { entries }
    }

    /// Load the registry from a `gpu_models.yaml` file, e.g.:
    ///
    /// ```yaml
    /// - model: "NVIDIA GeForce RTX 4090"
    ///   vram: 24
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::RegistryLoad(path.as_ref().display().to_string(), e.to_string()))?;
        Self::from_yaml(&text)
    }

    /// Parse the registry from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let entries: Vec<GpuModelEntry> = serde_yaml::from_str(yaml)
            .map_err(|e| Error::RegistryLoad("<inline>".into(), e.to_string()))?;
        tracing::debug!(count = entries.len(), "loaded GPU model registry");
        Ok(Self::new(entries))
    }

    /// Look up a GPU's VRAM class by its driver-reported display name.
    pub fn lookup(&self, display_name: &str) -> Option<&GpuModelEntry> {
        self.entries.get(display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
- model: "NVIDIA GeForce RTX 4090"
  vram: 24
- model: "NVIDIA GeForce RTX 3090"
  vram: 24
"#;

    #[test]
    fn looks_up_by_exact_display_name() {
        let registry = GpuRegistry::from_yaml(SAMPLE).unwrap();
        let entry = registry.lookup("NVIDIA GeForce RTX 4090").unwrap();
        assert_eq!(entry.vram_gib, 24);
    }

    #[test]
    fn unknown_display_name_misses() {
        let registry = GpuRegistry::from_yaml(SAMPLE).unwrap();
        assert!(registry.lookup("NVIDIA GeForce RTX 5090").is_none());
    }
}
