//! Opaque accessor over a KubeAI Model custom resource document.
//!
//! KubeAI CRs are loosely typed YAML blobs (§9 design note); rather than
//! mirror the full schema, the dispatch core touches only the handful of
//! fields it needs through this narrow wrapper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// `kubeai.org/v1, Model` custom resource, accessed through a narrow surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCrSpec(Value);

impl ModelCrSpec {
    /// Wrap an already-parsed document.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parse a document from its YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidModelCr(e.to_string()))?;
        Ok(Self(value))
    }

    /// `metadata.name`.
    pub fn get_name(&self) -> Result<&str> {
        self.0
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidModelCr("missing metadata.name".into()))
    }

    /// `metadata.namespace`, defaulting to `default` when absent.
    pub fn get_namespace(&self) -> &str {
        self.0
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .unwrap_or("default")
    }

    /// Overwrite `spec.resourceProfile`.
    pub fn set_resource_profile(&mut self, profile: &str) -> Result<()> {
        let spec = self
            .0
            .pointer_mut("/spec")
            .ok_or_else(|| Error::InvalidModelCr("missing spec".into()))?;
        spec["resourceProfile"] = Value::String(profile.to_string());
        Ok(())
    }

    /// The document as a `serde_json::Value`, ready to hand to the
    /// Kubernetes dynamic client.
    pub fn to_wire(&self) -> Value {
        self.0.clone()
    }
}
