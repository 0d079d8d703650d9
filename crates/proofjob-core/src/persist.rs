//! Writing the proof to `results.json`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PersistenceCause, ProofError, Result};

/// File name of the persisted proof inside the output directory.
pub const RESULTS_FILE_NAME: &str = "results.json";

/// Write `proof` as pretty JSON to `<output_dir>/results.json`.
///
/// The whole document is rendered before the file is opened, so a
/// serialization failure leaves any previous results untouched. The output
/// directory must already exist. Returns the path written.
pub fn persist<T: Serialize + ?Sized>(proof: &T, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(RESULTS_FILE_NAME);
    let to_error = |source: PersistenceCause| ProofError::Persistence {
        path: path.clone(),
        source,
    };

    let content = serde_json::to_vec_pretty(proof).map_err(|e| to_error(e.into()))?;
    std::fs::write(&path, content).map_err(|e| to_error(e.into()))?;

    Ok(path)
}
