//! `supported-model.yaml` loading and runtime-scoped validation (spec §9:
//! the `{ollama: [...], vllm: [...]}` shape this spec chose, and the
//! "reject iff absent from the *requested* runtime's list" semantics).

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Per-runtime allow-lists of catalog model names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowList {
    #[serde(default)]
    ollama: Vec<String>,
    #[serde(default)]
    vllm: Vec<String>,
}

impl AllowList {
    /// Load the allow-list from a `supported-model.yaml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::RegistryLoad(path.as_ref().display().to_string(), e.to_string()))?;
        Self::from_yaml(&text)
    }

    /// Parse the allow-list from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::RegistryLoad("<inline>".into(), e.to_string()))
    }

    /// `true` iff `model_name` appears in the list for `runtime`. An
    /// unrecognized runtime is never allowed — `dispatch-orchestrator`'s
    /// `validate()` rejects it as `UnsupportedRuntime` before this is called.
    pub fn allows(&self, model_name: &str, runtime: &str) -> bool {
        match runtime {
            "ollama" => self.ollama.iter().any(|m| m == model_name),
            "vllm" => self.vllm.iter().any(|m| m == model_name),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
ollama:
  - gemma2:9b
  - llama3.1:8b
vllm: []
"#;

    #[test]
    fn allows_model_listed_under_requested_runtime() {
        let list = AllowList::from_yaml(SAMPLE).unwrap();
        assert!(list.allows("gemma2:9b", "ollama"));
    }

    #[test]
    fn rejects_model_absent_from_requested_runtime_even_if_listed_elsewhere() {
        // "and-of-lookups" open question (spec §9): a model listed under
        // ollama but requested under vllm must be rejected, not accepted
        // because it exists *somewhere* in the allow-list.
        let list = AllowList::from_yaml(SAMPLE).unwrap();
        assert!(!list.allows("gemma2:9b", "vllm"));
    }

    #[test]
    fn rejects_unknown_model() {
        let list = AllowList::from_yaml(SAMPLE).unwrap();
        assert!(!list.allows("mystery:1b", "ollama"));
    }
}
