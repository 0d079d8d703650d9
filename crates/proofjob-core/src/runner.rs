//! Proof job orchestration.
//!
//! A run walks the [`RunStage`] states in order, executing each step exactly
//! once. The first failing step ends the run; nothing is retried or rolled
//! back, so a partially materialized input directory stays as it is.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use crate::config::{EnvSource, JobConfig};
use crate::error::ProofError;
use crate::generator::ProofGenerator;
use crate::materialize::validate_and_extract;
use crate::obs::{emit_run_failed, emit_run_finished, emit_run_started, emit_stage_completed, RunSpan};
use crate::persist::persist;
use crate::stage::RunStage;

/// A failed run: the last state reached and the error that stopped it.
#[derive(Debug)]
pub struct RunFailure {
    pub stage: RunStage,
    pub error: ProofError,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum RunOutcome<T> {
    /// Results were persisted.
    Completed(Completed<T>),
    Failed(RunFailure),
}

/// Details of a completed run.
#[derive(Debug)]
pub struct Completed<T> {
    pub proof: T,
    /// Path of the written results file.
    pub results_path: PathBuf,
}

impl<T> RunOutcome<T> {
    /// Process exit code: `0` when completed, `1` when failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed(_) => 0,
            RunOutcome::Failed(_) => 1,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    /// The final state: `Persisted`, or the last state reached before failing.
    pub fn stage(&self) -> RunStage {
        match self {
            RunOutcome::Completed(_) => RunStage::Persisted,
            RunOutcome::Failed(failure) => failure.stage,
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Failed(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<Completed<T>, RunFailure> {
        match self {
            RunOutcome::Completed(completed) => Ok(completed),
            RunOutcome::Failed(failure) => Err(failure),
        }
    }
}

/// Non-terminal pipeline state together with the data carried into the
/// next step.
enum PipelineState<P> {
    ConfigAssembled(JobConfig),
    InputValidated(JobConfig),
    ScoreGenerated(JobConfig, P),
}

impl<P> PipelineState<P> {
    fn stage(&self) -> RunStage {
        match self {
            PipelineState::ConfigAssembled(_) => RunStage::ConfigAssembled,
            PipelineState::InputValidated(_) => RunStage::InputValidated,
            PipelineState::ScoreGenerated(..) => RunStage::ScoreGenerated,
        }
    }
}

/// Where a successful step leads.
enum Advance<P> {
    Next(PipelineState<P>),
    Persisted(Completed<P>),
}

/// Runs one proof job with an injected generator.
pub struct JobRunner<G> {
    generator: G,
}

impl<G: ProofGenerator> JobRunner<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Assemble the configuration from `env`, then run the pipeline.
    pub fn run(&self, env: &impl EnvSource) -> RunOutcome<G::Proof> {
        let run_id = Uuid::new_v4().to_string();
        let _span = RunSpan::enter(&run_id);
        emit_run_started(&run_id);
        let start = Instant::now();

        let config = JobConfig::assemble(env);
        emit_stage_completed(RunStage::ConfigAssembled, elapsed_ms(start));

        self.drive(&run_id, start, PipelineState::ConfigAssembled(config))
    }

    /// Run the pipeline with an already assembled configuration.
    pub fn run_with_config(&self, config: JobConfig) -> RunOutcome<G::Proof> {
        let run_id = Uuid::new_v4().to_string();
        let _span = RunSpan::enter(&run_id);
        emit_run_started(&run_id);
        let start = Instant::now();

        self.drive(&run_id, start, PipelineState::ConfigAssembled(config))
    }

    fn drive(
        &self,
        run_id: &str,
        start: Instant,
        mut state: PipelineState<G::Proof>,
    ) -> RunOutcome<G::Proof> {
        loop {
            let stage = state.stage();
            let step_start = Instant::now();
            match self.step(state) {
                Ok(Advance::Next(next)) => {
                    emit_stage_completed(next.stage(), elapsed_ms(step_start));
                    state = next;
                }
                Ok(Advance::Persisted(completed)) => {
                    emit_stage_completed(RunStage::Persisted, elapsed_ms(step_start));
                    info!("Proof generation complete: {:?}", completed.proof);
                    emit_run_finished(run_id, elapsed_ms(start), true);
                    return RunOutcome::Completed(completed);
                }
                Err(error) => {
                    emit_run_failed(run_id, stage, &error);
                    emit_run_finished(run_id, elapsed_ms(start), false);
                    return RunOutcome::Failed(RunFailure { stage, error });
                }
            }
        }
    }

    /// Execute the single step leaving `state`.
    fn step(&self, state: PipelineState<G::Proof>) -> Result<Advance<G::Proof>, ProofError> {
        match state {
            PipelineState::ConfigAssembled(config) => {
                let report = validate_and_extract(&config.proof.input_dir)?;
                info!(
                    entries = report.entries_scanned,
                    archives = report.archives_expanded.len(),
                    extracted = report.files_extracted,
                    "Input materialized"
                );
                Ok(Advance::Next(PipelineState::InputValidated(config)))
            }
            PipelineState::InputValidated(config) => {
                let proof = self
                    .generator
                    .generate(&config.proof)
                    .map_err(ProofError::Scoring)?;
                Ok(Advance::Next(PipelineState::ScoreGenerated(config, proof)))
            }
            PipelineState::ScoreGenerated(config, proof) => {
                let results_path = persist(&proof, &config.output_dir)?;
                info!(path = %results_path.display(), "Results written");
                Ok(Advance::Persisted(Completed {
                    proof,
                    results_path,
                }))
            }
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
