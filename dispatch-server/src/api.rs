//! HTTP API (spec §6): version endpoint and streaming inference endpoint,
//! routed the way `core/src/admin_api.rs` roots its `Router`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use dispatch_orchestrator::{InferenceRequest, Orchestrator};

/// Shared state for every route: the composition root's orchestrator.
#[derive(Clone)]
pub struct AppState {
    /// The wired-up orchestrator every request runs through.
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Serialize)]
struct VersionResponse {
    status: &'static str,
    code: u16,
    message: String,
}

#[derive(Deserialize)]
struct InferenceRequestBody {
    model: String,
    system_prompt: String,
    user_prompt: String,
    #[serde(default = "default_temperature")]
    temperature: f64,
    max_tokens: Option<u32>,
    #[serde(default = "default_runtime")]
    runtime: String,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_runtime() -> String {
    "ollama".to_string()
}

#[derive(Serialize)]
struct InferenceEnvelope {
    status: &'static str,
    code: u16,
    chunk: Option<String>,
    error_message: Option<String>,
}

impl InferenceEnvelope {
    fn ok(chunk: String) -> Self {
        Self {
            status: "ok",
            code: 200,
            chunk: Some(chunk),
            error_message: None,
        }
    }

    fn error(err: dispatch_types::Error) -> Self {
        let code = err.status_code();
        tracing::error!(error = %err, code, "inference request failed");
        Self {
            status: "error",
            code,
            chunk: None,
            error_message: Some(err.to_string()),
        }
    }
}

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        status: "ok",
        code: 200,
        message: format!("gpu-dispatch {}", dispatch_types::VERSION),
    })
}

async fn root() -> impl IntoResponse {
    Redirect::temporary("/api/version")
}

async fn post_inference(
    State(state): State<AppState>,
    Json(body): Json<InferenceRequestBody>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let request = InferenceRequest {
        model: body.model,
        system_prompt: body.system_prompt,
        user_prompt: body.user_prompt,
        runtime: body.runtime,
        temperature: body.temperature,
        max_tokens: body.max_tokens,
    };

    let events = async_stream::stream! {
        match state.orchestrator.dispatch(&request).await {
            Ok(mut chunks) => {
                while let Some(next) = chunks.next().await {
                    let envelope = match next {
                        Ok(chat_chunk) => InferenceEnvelope::ok(chat_chunk.content),
                        Err(err) => {
                            yield Ok(to_event(&InferenceEnvelope::error(err)));
                            break;
                        }
                    };
                    yield Ok(to_event(&envelope));
                }
            }
            Err(err) => yield Ok(to_event(&InferenceEnvelope::error(err))),
        }
    };

    Sse::new(events)
}

fn to_event(envelope: &InferenceEnvelope) -> Event {
    Event::default().json_data(envelope).unwrap_or_else(|_| Event::default().data("{}"))
}

/// Build the `/api`-rooted router (spec §6).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/version", get(get_version))
        .route("/api/llm/inference", post(post_inference))
        .with_state(state)
}
