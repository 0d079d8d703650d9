//! Structured observability hooks for the proof job lifecycle.
//!
//! Events are emitted at `info!` level with an `event` field, except run
//! failure which is `error!`. Filter with `RUST_LOG`; set
//! `PROOF_LOG_FORMAT=json` for JSON output.

use tracing::{error, info};

use crate::error::ProofError;
use crate::stage::RunStage;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("0b7c...");
/// // Every event emitted while the guard lives carries run_id.
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("proofjob.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str) {
    info!(event = "run.started", run_id = %run_id);
}

/// Emit event: a step succeeded and the run reached `stage`.
pub fn emit_stage_completed(stage: RunStage, duration_ms: u64) {
    info!(
        event = "run.stage_completed",
        stage = %stage,
        duration_ms = duration_ms,
    );
}

/// Emit event: run finished with total duration and success status.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: run failed while leaving `stage`.
///
/// The message carries the full source chain.
pub fn emit_run_failed(run_id: &str, stage: RunStage, err: &ProofError) {
    error!(
        event = "run.failed",
        run_id = %run_id,
        stage = %stage,
        step = stage.step_name().unwrap_or("none"),
        kind = err.kind(),
        "Error during proof generation: {}",
        error_chain(err)
    );
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
