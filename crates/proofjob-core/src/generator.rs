//! Proof generator boundary.
//!
//! The job does not know how a proof is computed. It hands the
//! [`ProofConfig`] to a [`ProofGenerator`] and persists whatever comes back.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ProofConfig;

/// Produces one proof for the materialized input.
///
/// Called exactly once per run, blocking, with no timeout and no retry. Any
/// error is fatal to the run.
pub trait ProofGenerator {
    /// The attestation record. The job only serializes it.
    type Proof: Serialize + Debug;

    /// Score the input described by `config`.
    fn generate(&self, config: &ProofConfig) -> anyhow::Result<Self::Proof>;
}

impl<G: ProofGenerator + ?Sized> ProofGenerator for &G {
    type Proof = G::Proof;

    fn generate(&self, config: &ProofConfig) -> anyhow::Result<Self::Proof> {
        (**self).generate(config)
    }
}

/// Proof-of-contribution verdict consumed by the data liquidity pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProofResponse {
    /// Pool the proof was generated for.
    pub dlp_id: Option<String>,

    /// Whether the submission is accepted.
    pub valid: bool,

    /// Overall score in `[0, 1]`.
    pub score: f64,

    pub authenticity: f64,
    pub ownership: f64,
    pub quality: f64,
    pub uniqueness: f64,

    /// Public attributes of the submission.
    pub attributes: Map<String, Value>,

    /// Generator-specific details, not scored.
    pub metadata: Map<String, Value>,
}

impl ProofResponse {
    /// An empty, invalid response for `dlp_id`.
    pub fn new(dlp_id: Option<String>) -> Self {
        Self {
            dlp_id,
            ..Default::default()
        }
    }
}
