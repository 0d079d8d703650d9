//! proofjob - run one proof-of-contribution job.
//!
//! Reads `DLP_ID`, `INPUT_DIR`, `OUTPUT_DIR` and `DB_URI`, materializes the
//! input, generates a proof and writes `results.json`. Exits 0 when the
//! results were written and 1 otherwise.

use std::process::ExitCode;

use proofjob_core::{init_tracing, InventoryGenerator, JobRunner, LogSettings, ProcessEnv};
use tracing::Level;

fn main() -> ExitCode {
    let env = ProcessEnv;
    init_tracing(LogSettings::from_env(&env), Level::INFO);

    let outcome = JobRunner::new(InventoryGenerator).run(&env);
    let code = outcome.exit_code();

    if let Err(failure) = outcome.into_result() {
        let err = anyhow::Error::new(failure.error)
            .context(format!("proof job failed at stage {}", failure.stage));
        eprintln!("Error: {err:?}");
    }

    ExitCode::from(code)
}
