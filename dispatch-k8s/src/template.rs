//! Builtin Model CR template loading (ambient addition, grounded on
//! `backend/llm/models.py::OllamaBuiltinModel`).
//!
//! The original ships one static YAML per builtin catalog model under
//! `backend/k8s/deploy/kubeai/<model>-builtin.yaml`; this loader mirrors
//! that layout under a configurable registry directory and parameterizes
//! `spec.resourceProfile` before the document is handed to the
//! [`crate::reconciler::Reconciler`].

use std::path::{Path, PathBuf};

use dispatch_types::ModelCrSpec;

use crate::{Error, Result};

/// The six Ollama builtin models the original ships a template for.
pub const BUILTIN_MODELS: [&str; 6] = [
    "gemma2:2b",
    "gemma2:9b",
    "gemma2:27b",
    "llama3.1:8b",
    "llama3.2:3b",
    "llama3.3:70b",
];

/// Turn a catalog model id into its template filename, e.g. `gemma2:9b` →
/// `gemma2-9b-builtin.yaml`.
fn template_filename(model_id: &str) -> String {
    format!("{}-builtin.yaml", model_id.replace(':', "-"))
}

/// Load the builtin Model CR template for `model_id` from `templates_dir`,
/// then set `spec.resourceProfile` to `resource_profile`.
pub fn load_builtin_template(
    templates_dir: impl AsRef<Path>,
    model_id: &str,
    resource_profile: &str,
) -> Result<ModelCrSpec> {
    let path: PathBuf = templates_dir.as_ref().join(template_filename(model_id));
    let text = std::fs::read_to_string(&path).map_err(|e| {
        Error::TemplateLoad(path.display().to_string(), e.to_string())
    })?;
    let mut cr = ModelCrSpec::from_yaml(&text).map_err(Error::Types)?;
    cr.set_resource_profile(resource_profile)
        .map_err(Error::Types)?;
    Ok(cr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_match_original_layout() {
        assert_eq!(template_filename("gemma2:9b"), "gemma2-9b-builtin.yaml");
        assert_eq!(template_filename("llama3.1:8b"), "llama3.1-8b-builtin.yaml");
    }

    #[test]
    fn missing_template_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_builtin_template(dir.path(), "gemma2:9b", "nvidia-gpu-4090-24gb:1")
            .unwrap_err();
        assert!(matches!(err, Error::TemplateLoad(_, _)));
    }

    #[test]
    fn loads_and_parameterizes_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gemma2-9b-builtin.yaml"),
            r#"
apiVersion: kubeai.org/v1
kind: Model
metadata:
  name: gemma2-9b
  namespace: default
spec:
  resourceProfile: ""
"#,
        )
        .unwrap();

        let cr = load_builtin_template(dir.path(), "gemma2:9b", "nvidia-gpu-4090-24gb:1").unwrap();
        assert_eq!(cr.get_name().unwrap(), "gemma2-9b");
        assert_eq!(
            cr.to_wire().pointer("/spec/resourceProfile").and_then(serde_json::Value::as_str),
            Some("nvidia-gpu-4090-24gb:1")
        );
    }
}
