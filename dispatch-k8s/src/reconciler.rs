//! CR Reconciler (spec §4.6): list→create-or-patch against the dynamic
//! `kubeai.org/v1, Model` resource.

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams, Patch, PatchParams, PostParams, TypeMeta};
use kube::core::{ApiResource, GroupVersionKind};
use kube::Client;

use dispatch_types::ModelCrSpec;

use crate::{Error, Result};

/// The `kubeai.org/v1, Model` resource descriptor, used to address the
/// dynamic client without a generated type for the CRD.
pub fn model_api_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk("kubeai.org", "v1", "Model"))
}

/// Applies a [`ModelCrSpec`] to a cluster. Implemented by [`Reconciler`] for
/// production use and by test fakes for unit tests (spec §8's "explicit,
/// testable construction" requirement).
#[async_trait]
pub trait Reconciling: Send + Sync {
    /// Create or patch `model_cr` in the cluster.
    async fn apply(&self, model_cr: &ModelCrSpec) -> Result<()>;
}

/// Reconciles [`ModelCrSpec`] documents against a cluster: list existing
/// Model resources in the document's namespace, then create or patch.
pub struct Reconciler {
    client: Client,
    resource: ApiResource,
}

impl Reconciler {
    /// Build a reconciler over an already-authenticated client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resource: model_api_resource(),
        }
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }
}

#[async_trait]
impl Reconciling for Reconciler {
    /// Apply `model_cr` to the cluster (spec §4.6):
    ///
    /// 1. List all Model resources in `model_cr`'s namespace.
    /// 2. If none exist, or none match `metadata.name`, create it.
    /// 3. Else patch the existing resource.
    ///
    /// A 409 from either call is terminal for this request and surfaces as
    /// [`Error::ReconciliationFailed`] — not retried internally.
    async fn apply(&self, model_cr: &ModelCrSpec) -> Result<()> {
        let name = model_cr.get_name().map_err(Error::Types)?;
        let namespace = model_cr.get_namespace();
        let api = self.api(namespace);

        let existing = api
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::ReconciliationFailed(e.to_string()))?;

        let found = existing
            .items
            .iter()
            .any(|item| item.metadata.name.as_deref() == Some(name));

        if found {
            tracing::info!(model = name, namespace, "patching existing Model CR");
            let patch = Patch::Merge(model_cr.to_wire());
            api.patch(name, &PatchParams::default(), &patch)
                .await
                .map_err(|e| Error::ReconciliationFailed(e.to_string()))?;
        } else {
            tracing::info!(model = name, namespace, "creating Model CR");
            let mut obj: DynamicObject = serde_json::from_value(model_cr.to_wire())
                .map_err(|e| Error::ReconciliationFailed(e.to_string()))?;
            obj.types = Some(TypeMeta {
                api_version: "kubeai.org/v1".to_string(),
                kind: "Model".to_string(),
            });
            api.create(&PostParams::default(), &obj)
                .await
                .map_err(|e| Error::ReconciliationFailed(e.to_string()))?;
        }

        Ok(())
    }
}
