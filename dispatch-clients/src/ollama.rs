//! Model Catalog Adapter: resolves a catalog model name to a
//! [`ModelDescriptor`] (spec §4.3).

use async_trait::async_trait;
use serde::Deserialize;

use dispatch_estimator::{parse_parameter_size, parse_quant_bits};
use dispatch_types::ModelDescriptor;

use crate::{Error, Result};

/// A resolver from `(model_name, runtime)` to a [`ModelDescriptor`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Resolve `model_name` under `runtime`. Only `"ollama"` is implemented;
    /// `"vllm"` always fails with [`Error::UnsupportedRuntime`].
    async fn resolve(&self, model_name: &str, runtime: &str) -> Result<ModelDescriptor>;
}

/// Ollama-compatible catalog client (the "Ollama Parameters Worker" of the
/// original design).
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Build a client against the Ollama-compatible catalog endpoint.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn list(&self) -> Result<Vec<CatalogModel>> {
        let url = format!("{}/api/tags", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string(), e.status().map(|s| s.as_u16())))?;

        if !response.status().is_success() {
            return Err(Error::Network(
                format!("catalog list returned {}", response.status()),
                Some(response.status().as_u16()),
            ));
        }

        let parsed: CatalogList = response
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string(), None))?;
        Ok(parsed.models)
    }
}

#[async_trait]
impl CatalogSource for OllamaClient {
    async fn resolve(&self, model_name: &str, runtime: &str) -> Result<ModelDescriptor> {
        if runtime != "ollama" {
            return Err(Error::UnsupportedRuntime(runtime.to_string()));
        }

        let models = self.list().await?;
        let model = models
            .into_iter()
            .find(|m| m.model == model_name)
            .ok_or_else(|| Error::CatalogLookup {
                model: model_name.to_string(),
                reason: "model not present in catalog".to_string(),
            })?;

        let parameter_size_billion =
            parse_parameter_size(&model.details.parameter_size).map_err(|e| Error::CatalogLookup {
                model: model_name.to_string(),
                reason: e.to_string(),
            })?;
        let quantization_bits =
            parse_quant_bits(&model.details.quantization_level).map_err(|e| Error::CatalogLookup {
                model: model_name.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(model = %model_name, parameter_size_billion, quantization_bits, "resolved catalog model");

        Ok(ModelDescriptor::new(
            model_name,
            parameter_size_billion,
            quantization_bits,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct CatalogList {
    models: Vec<CatalogModel>,
}

#[derive(Debug, Deserialize)]
struct CatalogModel {
    model: String,
    details: CatalogModelDetails,
}

#[derive(Debug, Deserialize)]
struct CatalogModelDetails {
    parameter_size: String,
    quantization_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCatalog(Vec<CatalogModel>);

    #[async_trait]
    impl CatalogSource for FixedCatalog {
        async fn resolve(&self, model_name: &str, runtime: &str) -> Result<ModelDescriptor> {
            if runtime != "ollama" {
                return Err(Error::UnsupportedRuntime(runtime.to_string()));
            }
            let model = self
                .0
                .iter()
                .find(|m| m.model == model_name)
                .ok_or_else(|| Error::CatalogLookup {
                    model: model_name.to_string(),
                    reason: "not found".into(),
                })?;
            let p = parse_parameter_size(&model.details.parameter_size).unwrap();
            let q = parse_quant_bits(&model.details.quantization_level).unwrap();
            Ok(ModelDescriptor::new(model_name, p, q))
        }
    }

    fn fixture() -> FixedCatalog {
        FixedCatalog(vec![CatalogModel {
            model: "gemma2:9b".into(),
            details: CatalogModelDetails {
                parameter_size: "9B".into(),
                quantization_level: "Q4_K_M".into(),
            },
        }])
    }

    #[tokio::test]
    async fn resolves_known_model_under_ollama() {
        let descriptor = fixture().resolve("gemma2:9b", "ollama").await.unwrap();
        assert_eq!(descriptor.parameter_size_billion, 9.0);
        assert_eq!(descriptor.quantization_bits, 4);
    }

    #[tokio::test]
    async fn vllm_runtime_is_unsupported() {
        let err = fixture().resolve("gemma2:9b", "vllm").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedRuntime(_)));
    }
}
