//! Composition root (spec §9): builds every dependency once, runs the
//! CLI's one-shot inference fan-out (mirroring `app.py::run`), and serves
//! the HTTP API until shut down.

mod api;
mod cli;

use std::io::Write;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::info;

use dispatch_clients::{ChatChunk, Credentials, OllamaClient, OpenAiClient, PrometheusClient, PrometheusConfig};
use dispatch_orchestrator::{fan_out, InferenceRequest, Orchestrator, OrchestratorConfig};
use dispatch_registry::{AllowList, GpuRegistry};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let args = cli::Args::parse();
    let config = OrchestratorConfig::load(&args.config).unwrap_or_else(|err| {
        tracing::warn!(error = %err, path = %args.config, "falling back to default config");
        OrchestratorConfig::default()
    });

    info!(version = %dispatch_types::VERSION, "starting dispatch-server");

    let http = reqwest::Client::new();
    let timeout = std::time::Duration::from_secs(config.timeout_seconds);

    let catalog: Arc<dyn dispatch_clients::CatalogSource> = Arc::new(OllamaClient::new(
        http.clone(),
        config.ollama_parameters_worker_url.clone(),
    ));
    let telemetry: Arc<dyn dispatch_clients::TelemetrySource> = Arc::new(PrometheusClient::new(
        http.clone(),
        PrometheusConfig {
            url: config.prometheus_url.clone(),
            timeout,
        },
    ));
    let registries_dir = config.registries_dir.trim_end_matches('/');
    let gpu_registry = GpuRegistry::load(format!("{registries_dir}/gpu_models.yaml"))?;
    let allow_list = AllowList::load(format!("{registries_dir}/supported-model.yaml"))?;

    let kube_client = kube::Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("failed to build Kubernetes client: {e}"))?;
    let reconciler = dispatch_k8s::Reconciler::new(kube_client);

    let chat_client = OpenAiClient::new(
        http.clone(),
        config.webui_url.clone(),
        config.base_url.clone(),
        timeout,
    );
    let credentials = Credentials {
        email: config.user.email.clone(),
        password: config.user.password.clone(),
    };

    let orchestrator = Arc::new(Orchestrator::new(
        catalog,
        telemetry,
        gpu_registry,
        allow_list,
        Arc::new(reconciler),
        Arc::new(chat_client),
        credentials,
        &config,
    ));

    let app_state = api::AppState {
        orchestrator: Arc::clone(&orchestrator),
    };
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "HTTP API listening");
    let server = tokio::spawn(async move {
        axum::serve(listener, api::router(app_state)).await
    });

    let requests: Vec<InferenceRequest> = (0..config.concurrent)
        .map(|_| InferenceRequest {
            model: args.model.clone(),
            system_prompt: args.system_prompt.clone(),
            user_prompt: args.user_prompt.clone(),
            runtime: "ollama".to_string(),
            temperature: 0.7,
            max_tokens: None,
        })
        .collect();

    let stdout = Arc::new(Mutex::new(std::io::stdout()));
    let sink: dispatch_orchestrator::Sink = Arc::new(move |_index: usize, chunk: &ChatChunk| {
        let mut out = stdout.lock().expect("stdout lock poisoned");
        let _ = write!(out, "{}", chunk.content);
        let _ = out.flush();
    });

    for outcome in fan_out(Arc::clone(&orchestrator), requests, sink).await {
        if let Err(err) = outcome {
            tracing::error!(error = %err, "inference run failed");
        }
    }
    println!();

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.abort();
    Ok(())
}
