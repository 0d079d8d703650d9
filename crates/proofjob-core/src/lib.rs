//! proofjob - proof-of-contribution job harness
//!
//! Runs one proof job end to end:
//! - Assembles configuration from the environment
//! - Validates the input directory and expands top-level zip archives
//! - Hands the input to a [`ProofGenerator`]
//! - Persists the proof to `results.json`
//!
//! [`JobRunner`] sequences the steps and reports a [`RunOutcome`] whose
//! exit code the binary returns to the scheduler.

pub mod config;
pub mod error;
pub mod generator;
pub mod inventory;
pub mod materialize;
pub mod obs;
pub mod persist;
pub mod runner;
pub mod stage;
pub mod telemetry;

// Re-export key types
pub use config::{
    EnvSource, JobConfig, LogSettings, ModelReference, ProcessEnv, ProofConfig, StorageUri,
};
pub use error::{ExtractionCause, PersistenceCause, ProofError, Result};
pub use generator::{ProofGenerator, ProofResponse};
pub use inventory::{InputInventory, InventoryGenerator};
pub use materialize::{is_archive, validate_and_extract, MaterializeReport};
pub use obs::{error_chain, RunSpan};
pub use persist::{persist, RESULTS_FILE_NAME};
pub use runner::{Completed, JobRunner, RunFailure, RunOutcome};
pub use stage::RunStage;
pub use telemetry::init_tracing;

/// proofjob version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
