//! Concurrency Harness (spec §4.8): run many orchestrator requests
//! concurrently without letting one failure cancel its siblings, streaming
//! each job's chunks to its own sink as they arrive rather than buffering
//! them (spec §4.8/§5: jobs are genuinely concurrent at the sink, so chunk
//! order across jobs is interleaved and unordered, the way
//! `app.py::run`'s `asyncio.gather` over `print(chunk.content, end="")`
//! tasks interleaves real stdout writes).

use std::sync::Arc;

use dispatch_clients::ChatChunk;
use dispatch_types::Error;
use futures::stream::StreamExt;

use crate::orchestrator::{InferenceRequest, Orchestrator};

/// A per-job sink invoked with the job's index and each chunk as it is
/// pulled off that job's stream. Called concurrently from every spawned
/// task, so it must be `Send + Sync`; the caller is responsible for
/// serializing access to whatever it writes to (e.g. a locked stdout).
pub type Sink = Arc<dyn Fn(usize, &ChatChunk) + Send + Sync>;

/// The outcome of one fanned-out orchestrator run: `Ok(())` once every
/// chunk has been forwarded to the sink, or the error that ended the
/// stream early.
pub type OrchestratorOutcome = crate::Result<()>;

/// Run `requests` concurrently against `orchestrator`, one `tokio::spawn`
/// task per request. Uses `futures::future::join_all` rather than
/// `try_join_all` — a panicking or failing task does not cancel the others,
/// and every caller observes its own outcome independently (spec §4.8).
pub async fn fan_out(
    orchestrator: Arc<Orchestrator>,
    requests: Vec<InferenceRequest>,
    sink: Sink,
) -> Vec<OrchestratorOutcome> {
    let tasks = requests.into_iter().enumerate().map(|(index, request)| {
        let orchestrator = Arc::clone(&orchestrator);
        let sink = Arc::clone(&sink);
        tokio::spawn(run_one(orchestrator, request, index, sink))
    });

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(outcome) => outcome,
            Err(join_err) => Err(Error::StreamFailed(join_err.to_string())),
        })
        .collect()
}

async fn run_one(
    orchestrator: Arc<Orchestrator>,
    request: InferenceRequest,
    index: usize,
    sink: Sink,
) -> OrchestratorOutcome {
    let mut stream = orchestrator.dispatch(&request).await?;
    while let Some(chunk) = stream.next().await {
        sink(index, &chunk?);
    }
    Ok(())
}
