//! Lifecycle states of a proof job run.

use serde::{Deserialize, Serialize};

/// The last state a run reached.
///
/// Runs move strictly forward: `Start → ConfigAssembled → InputValidated →
/// ScoreGenerated → Persisted`. A failure from any non-terminal state ends the
/// run; see [`RunOutcome`](crate::runner::RunOutcome).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Start,
    ConfigAssembled,
    InputValidated,
    ScoreGenerated,
    Persisted,
}

impl RunStage {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            RunStage::Start => "start",
            RunStage::ConfigAssembled => "config_assembled",
            RunStage::InputValidated => "input_validated",
            RunStage::ScoreGenerated => "score_generated",
            RunStage::Persisted => "persisted",
        }
    }

    /// The state reached when the step leaving this one succeeds.
    pub fn next(&self) -> Option<RunStage> {
        match self {
            RunStage::Start => Some(RunStage::ConfigAssembled),
            RunStage::ConfigAssembled => Some(RunStage::InputValidated),
            RunStage::InputValidated => Some(RunStage::ScoreGenerated),
            RunStage::ScoreGenerated => Some(RunStage::Persisted),
            RunStage::Persisted => None,
        }
    }

    /// Name of the work performed when leaving this state.
    pub fn step_name(&self) -> Option<&'static str> {
        match self {
            RunStage::Start => Some("assemble_config"),
            RunStage::ConfigAssembled => Some("materialize_input"),
            RunStage::InputValidated => Some("generate_proof"),
            RunStage::ScoreGenerated => Some("persist_results"),
            RunStage::Persisted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(RunStage::Start.name(), "start");
        assert_eq!(RunStage::ConfigAssembled.name(), "config_assembled");
        assert_eq!(RunStage::InputValidated.name(), "input_validated");
        assert_eq!(RunStage::ScoreGenerated.name(), "score_generated");
        assert_eq!(RunStage::Persisted.name(), "persisted");
    }

    #[test]
    fn test_stages_advance_in_fixed_order() {
        let mut stage = RunStage::Start;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited.len(), 5);
        assert_eq!(stage, RunStage::Persisted);
    }

    #[test]
    fn test_only_persisted_is_terminal() {
        assert!(RunStage::Persisted.is_terminal());
        assert!(RunStage::Persisted.step_name().is_none());
        assert!(!RunStage::ScoreGenerated.is_terminal());
        assert_eq!(RunStage::InputValidated.step_name(), Some("generate_proof"));
    }

    #[test]
    fn test_stage_serde_snake_case() {
        let json = serde_json::to_string(&RunStage::InputValidated).expect("serialize");
        assert_eq!(json, "\"input_validated\"");
    }
}
