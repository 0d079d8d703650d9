//! Error taxonomy for a proof job run.
//!
//! Every variant is fatal to the run: nothing is retried and nothing is
//! recovered locally. The runner catches the error once and turns it into
//! a failed [`RunOutcome`](crate::runner::RunOutcome).

use std::path::PathBuf;

/// Why an archive could not be expanded.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// Why the results file could not be written.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Proof job errors.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("no input files found in {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to extract archive {}", archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: ExtractionCause,
    },

    #[error("proof generation failed")]
    Scoring(#[source] anyhow::Error),

    #[error("failed to write results to {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: PersistenceCause,
    },
}

impl ProofError {
    /// Short machine-friendly name of the error class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProofError::InputNotFound(_) => "input_not_found",
            ProofError::Extraction { .. } => "extraction_failure",
            ProofError::Scoring(_) => "scoring_failure",
            ProofError::Persistence { .. } => "persistence_error",
        }
    }
}

/// Result type for proof job operations.
pub type Result<T> = std::result::Result<T, ProofError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_display() {
        let err = ProofError::InputNotFound(PathBuf::from("/input"));
        assert_eq!(err.to_string(), "no input files found in /input");
        assert_eq!(err.kind(), "input_not_found");
    }

    #[test]
    fn test_extraction_error_keeps_source() {
        let err = ProofError::Extraction {
            archive: PathBuf::from("/input/data.zip"),
            source: ExtractionCause::Zip(zip::result::ZipError::FileNotFound),
        };
        assert!(err.to_string().contains("/input/data.zip"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind(), "extraction_failure");
    }

    #[test]
    fn test_scoring_error_wraps_generator_error() {
        let err = ProofError::Scoring(anyhow::anyhow!("model weights missing"));
        assert_eq!(err.to_string(), "proof generation failed");
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "model weights missing");
        assert_eq!(err.kind(), "scoring_failure");
    }

    #[test]
    fn test_persistence_error_display() {
        let err = ProofError::Persistence {
            path: PathBuf::from("/output/results.json"),
            source: PersistenceCause::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such directory",
            )),
        };
        assert!(err.to_string().contains("/output/results.json"));
        assert_eq!(err.kind(), "persistence_error");
    }
}
