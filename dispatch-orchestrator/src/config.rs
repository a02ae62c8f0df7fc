//! Orchestrator configuration (`config.yaml`, spec §6).

use serde::{Deserialize, Serialize};

/// Sign-in credentials loaded from config, matching `app.py::run`'s
/// `user.email` / `user.password` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Sign-in email.
    pub email: String,
    /// Sign-in password.
    pub password: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            email: "admin@localhost".to_string(),
            password: "changeme".to_string(),
        }
    }
}

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Config schema version.
    pub version: u32,
    /// HTTP listen host.
    pub host: String,
    /// HTTP listen port.
    pub port: u16,
    /// Base URL of the OpenAI-compatible chat-completion endpoint.
    pub base_url: String,
    /// Base URL of the webui fronting `/auths/signin` and `/auths/api_key`.
    pub webui_url: String,
    /// Deadline, in seconds, for outbound HTTP calls.
    pub timeout_seconds: u64,
    /// Auth bootstrap credentials.
    pub user: UserConfig,
    /// Base URL of the Ollama-compatible catalog endpoint.
    pub ollama_parameters_worker_url: String,
    /// Maximum number of concurrent fanned-out orchestrator runs.
    pub concurrent: usize,
    /// Base URL of the DCGM-exporting Prometheus server.
    pub prometheus_url: String,
    /// Kubernetes namespace Model CRs are reconciled into.
    pub k8s_namespace: String,
    /// Directory holding `gpu_models.yaml`, `supported-model.yaml`, and
    /// `kubeai/<model>-builtin.yaml` templates.
    pub registries_dir: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_url: "http://localhost:11434".to_string(),
            webui_url: "http://localhost:8081".to_string(),
            timeout_seconds: 60,
            user: UserConfig::default(),
            ollama_parameters_worker_url: "http://localhost:11434".to_string(),
            concurrent: 4,
            prometheus_url: "http://localhost:9090".to_string(),
            k8s_namespace: "default".to_string(),
            registries_dir: "registries".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from a YAML file, falling back to defaults for
    /// any field the file omits is handled by `serde_yaml`'s normal
    /// missing-field behavior — callers should ship a complete file.
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&text)
            .map_err(|e| dispatch_types::Error::InvalidRequest(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loadable_round_trip() {
        let config = OrchestratorConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: OrchestratorConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.port, config.port);
    }
}
