use serde::{Deserialize, Serialize};

/// Engine-reported terminal status of a single planner run.
///
/// The variant set mirrors the engine's wire names. Statuses outside the
/// positive subset still come from a clean engine run and are recorded as
/// results, not errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlannerOutcome {
    SolvedSatisficing,
    SolvedOptimally,
    UnsolvableProven,
    UnsolvableIncompletely,
    Timeout,
    Memout,
    InternalError,
    UnsupportedProblem,
    Intermediate,
}

impl PlannerOutcome {
    /// Wire name of the status, as stored in result records.
    pub fn name(self) -> &'static str {
        match self {
            PlannerOutcome::SolvedSatisficing => "SOLVED_SATISFICING",
            PlannerOutcome::SolvedOptimally => "SOLVED_OPTIMALLY",
            PlannerOutcome::UnsolvableProven => "UNSOLVABLE_PROVEN",
            PlannerOutcome::UnsolvableIncompletely => "UNSOLVABLE_INCOMPLETELY",
            PlannerOutcome::Timeout => "TIMEOUT",
            PlannerOutcome::Memout => "MEMOUT",
            PlannerOutcome::InternalError => "INTERNAL_ERROR",
            PlannerOutcome::UnsupportedProblem => "UNSUPPORTED_PROBLEM",
            PlannerOutcome::Intermediate => "INTERMEDIATE",
        }
    }

    /// True when the engine produced a usable plan.
    pub fn is_positive(self) -> bool {
        matches!(
            self,
            PlannerOutcome::SolvedSatisficing | PlannerOutcome::SolvedOptimally
        )
    }
}
