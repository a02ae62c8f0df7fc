//! Inference Orchestrator (spec §4.7): wires resolution, estimation,
//! inventory, selection, profile synthesis, CR reconciliation, and
//! streaming chat into one per-request pipeline.

use std::sync::Arc;

use futures::stream::{Stream, StreamExt};
use tokio::sync::OnceCell;

use dispatch_clients::{CatalogSource, ChatChunk, ChatSource, Credentials, TelemetrySource};
use dispatch_k8s::Reconciling;
use dispatch_registry::{AllowList, GpuRegistry};
use dispatch_types::Error;

use crate::auth::{self, AuthState};
use crate::config::OrchestratorConfig;
use crate::validate;

/// One inference request (spec §6's `POST /api/llm/inference` body).
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Catalog model id, e.g. `gemma2:9b`.
    pub model: String,
    /// System prompt.
    pub system_prompt: String,
    /// User prompt.
    pub user_prompt: String,
    /// Runtime the model is requested under (`"ollama"` or `"vllm"`).
    pub runtime: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Optional max token budget.
    pub max_tokens: Option<u32>,
}

/// Dependencies the orchestrator needs to run one request. Built once at
/// startup (spec §9's composition-root pattern) and shared across requests.
pub struct Orchestrator {
    catalog: Arc<dyn CatalogSource>,
    telemetry: Arc<dyn TelemetrySource>,
    gpu_registry: GpuRegistry,
    allow_list: AllowList,
    reconciler: Arc<dyn Reconciling>,
    chat_client: Arc<dyn ChatSource>,
    credentials: Credentials,
    auth: OnceCell<AuthState>,
    templates_dir: String,
}

impl Orchestrator {
    /// Build an orchestrator from its dependencies. `templates_dir` comes
    /// from [`OrchestratorConfig`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        telemetry: Arc<dyn TelemetrySource>,
        gpu_registry: GpuRegistry,
        allow_list: AllowList,
        reconciler: Arc<dyn Reconciling>,
        chat_client: Arc<dyn ChatSource>,
        credentials: Credentials,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            catalog,
            telemetry,
            gpu_registry,
            allow_list,
            reconciler,
            chat_client,
            credentials,
            auth: OnceCell::new(),
            templates_dir: format!("{}/kubeai", config.registries_dir.trim_end_matches('/')),
        }
    }

    async fn auth_state(&self) -> crate::Result<&AuthState> {
        self.auth
            .get_or_try_init(|| auth::bootstrap(self.chat_client.as_ref(), &self.credentials))
            .await
    }

    /// Run the full pipeline for `request`, returning a lazy stream of chat
    /// chunks. Nothing downstream of the returned stream is buffered — the
    /// caller drives it to completion (spec §9: streaming is a lazy finite
    /// sequence, not restartable).
    pub async fn dispatch(
        &self,
        request: &InferenceRequest,
    ) -> crate::Result<impl Stream<Item = crate::Result<ChatChunk>> + '_> {
        validate::validate(&self.allow_list, &request.model, &request.runtime)?;

        let descriptor = self
            .catalog
            .resolve(&request.model, &request.runtime)
            .await?;
        let required_mib = dispatch_estimator::estimate_vram_mib(&descriptor);

        let bundle = self.telemetry.snapshot().await?;
        let inventory = dispatch_planner::build_inventory(&bundle)?;

        let selection = dispatch_planner::select(&inventory, required_mib).ok_or_else(|| {
            tracing::warn!(model = %request.model, required_mib, "no node has enough free VRAM");
            Error::NoAvailableGpu
        })?;

        let profile = dispatch_planner::synthesize(&inventory, &selection, &self.gpu_registry)?;

        let cr = dispatch_k8s::load_builtin_template(
            &self.templates_dir,
            &request.model,
            profile.as_str(),
        )?;
        self.reconciler.apply(&cr).await?;

        let auth = self.auth_state().await?;
        let cr_name = cr.get_name()?.to_string();

        let stream = self
            .chat_client
            .chat_completions(
                &cr_name,
                &request.system_prompt,
                &request.user_prompt,
                &auth.api_key,
                request.temperature,
                request.max_tokens,
            )
            .await?;

        Ok(stream.map(|chunk| chunk.map_err(Error::from)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use async_trait::async_trait;
    use futures::stream::BoxStream;

    use dispatch_clients::prometheus::Sample;
    use dispatch_clients::TelemetryBundle;
    use dispatch_types::ModelDescriptor;

    /// Resolves a fixed set of catalog models under `"ollama"`; any other
    /// model or runtime fails, the way a real catalog would for an unknown
    /// key.
    #[derive(Clone, Default)]
    pub(crate) struct FakeCatalog {
        descriptors: std::collections::HashMap<String, ModelDescriptor>,
    }

    impl FakeCatalog {
        pub(crate) fn with_gemma2_9b() -> Self {
            let mut descriptors = std::collections::HashMap::new();
            descriptors.insert(
                "gemma2:9b".to_string(),
                ModelDescriptor::new("gemma2:9b", 9.0, 4),
            );
            Self { descriptors }
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn resolve(&self, model_name: &str, runtime: &str) -> dispatch_clients::Result<ModelDescriptor> {
            if runtime != "ollama" {
                return Err(dispatch_clients::Error::UnsupportedRuntime(runtime.to_string()));
            }
            self.descriptors.get(model_name).cloned().ok_or_else(|| {
                dispatch_clients::Error::CatalogLookup {
                    model: model_name.to_string(),
                    reason: "not found".to_string(),
                }
            })
        }
    }

    /// Serves a fixed telemetry bundle: one GPU on `node-a`, cuda index 0,
    /// reporting `free_mib` of free memory.
    #[derive(Clone)]
    pub(crate) struct FakeTelemetry {
        bundle: TelemetryBundle,
    }

    impl FakeTelemetry {
        fn with_free_mib(free_mib: f64) -> Self {
            let sample = |value: f64| Sample {
                node: "node-a".to_string(),
                gpu_index: 0,
                uuid: "GPU-00000000".to_string(),
                model_name: "NVIDIA GeForce RTX 4090".to_string(),
                value,
            };
            Self {
                bundle: TelemetryBundle {
                    results: vec![
                        ("DCGM_FI_DEV_FB_FREE", vec![sample(free_mib)]),
                        ("DCGM_FI_DEV_FB_USED", vec![sample(1.0)]),
                        ("DCGM_FI_DEV_GPU_TEMP", vec![sample(40.0)]),
                        ("DCGM_FI_DEV_GPU_UTIL", vec![sample(0.0)]),
                        ("DCGM_FI_DEV_POWER_USAGE", vec![sample(100.0)]),
                    ],
                },
            }
        }

        /// Plenty of free VRAM for `gemma2:9b`'s ~5.4 GiB estimate.
        pub(crate) fn with_gpu() -> Self {
            Self::with_free_mib(24_000.0)
        }

        /// Too little free VRAM for any real model.
        pub(crate) fn starved() -> Self {
            Self::with_free_mib(16.0)
        }
    }

    #[async_trait]
    impl TelemetrySource for FakeTelemetry {
        async fn snapshot(&self) -> dispatch_clients::Result<TelemetryBundle> {
            Ok(self.bundle.clone())
        }
    }

    #[derive(Default)]
    struct FakeReconciler;

    #[async_trait]
    impl Reconciling for FakeReconciler {
        async fn apply(&self, _model_cr: &dispatch_types::ModelCrSpec) -> dispatch_k8s::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeChat;

    #[async_trait]
    impl ChatSource for FakeChat {
        async fn auth_signin(&self, _credentials: &Credentials) -> dispatch_clients::Result<String> {
            Ok("token".to_string())
        }

        async fn generate_api_key(&self, _token: &str) -> dispatch_clients::Result<String> {
            Ok("key".to_string())
        }

        async fn chat_completions(
            &self,
            _model: &str,
            _system_prompt: &str,
            _user_prompt: &str,
            _api_key: &str,
            _temperature: f64,
            _max_tokens: Option<u32>,
        ) -> dispatch_clients::Result<BoxStream<'static, dispatch_clients::Result<ChatChunk>>> {
            let chunks = vec![
                Ok(ChatChunk { content: "hello ".to_string() }),
                Ok(ChatChunk { content: "world".to_string() }),
            ];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    /// Build an orchestrator over fakes, with a builtin template pre-seeded
    /// on disk for `gemma2:9b` (the reconciler and chat client are fakes,
    /// but `load_builtin_template` still reads a real file).
    pub(crate) fn fake_orchestrator(catalog: FakeCatalog, telemetry: FakeTelemetry) -> Orchestrator {
        let gpu_registry =
            GpuRegistry::from_yaml("- model: \"NVIDIA GeForce RTX 4090\"\n  vram: 24\n").unwrap();
        let allow_list = AllowList::from_yaml("ollama:\n  - gemma2:9b\nvllm: []\n").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let kubeai_dir = dir.path().join("kubeai");
        std::fs::create_dir_all(&kubeai_dir).unwrap();
        std::fs::write(
            kubeai_dir.join("gemma2-9b-builtin.yaml"),
            "apiVersion: kubeai.org/v1\nkind: Model\nmetadata:\n  name: gemma2-9b\n  namespace: default\nspec:\n  resourceProfile: \"\"\n",
        )
        .unwrap();

        let mut config = OrchestratorConfig::default();
        config.registries_dir = dir.into_path().display().to_string();

        Orchestrator::new(
            Arc::new(catalog),
            Arc::new(telemetry),
            gpu_registry,
            allow_list,
            Arc::new(FakeReconciler),
            Arc::new(FakeChat),
            Credentials {
                email: "admin@localhost".to_string(),
                password: "changeme".to_string(),
            },
            &config,
        )
    }

    #[tokio::test]
    async fn happy_path_streams_every_chunk() {
        let orchestrator = fake_orchestrator(FakeCatalog::with_gemma2_9b(), FakeTelemetry::with_gpu());
        let request = InferenceRequest {
            model: "gemma2:9b".to_string(),
            system_prompt: "s".to_string(),
            user_prompt: "u".to_string(),
            runtime: "ollama".to_string(),
            temperature: 0.7,
            max_tokens: None,
        };

        let stream = orchestrator.dispatch(&request).await.unwrap();
        let chunks: Vec<ChatChunk> = stream.map(|c| c.unwrap()).collect().await;
        let content: String = chunks.into_iter().map(|c| c.content).collect();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn no_free_vram_is_reported_as_no_available_gpu() {
        let orchestrator = fake_orchestrator(FakeCatalog::with_gemma2_9b(), FakeTelemetry::starved());
        let request = InferenceRequest {
            model: "gemma2:9b".to_string(),
            system_prompt: "s".to_string(),
            user_prompt: "u".to_string(),
            runtime: "ollama".to_string(),
            temperature: 0.7,
            max_tokens: None,
        };

        let err = orchestrator.dispatch(&request).await.unwrap_err();
        assert!(matches!(err, Error::NoAvailableGpu));
    }
}
