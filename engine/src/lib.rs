//! Client seam for the external planning engine.
//!
//! The pipeline never interprets PDDL itself: parsing and plan search are
//! owned by an engine executable available on the cluster nodes. This crate
//! defines the call surface the job driver depends on, the fixed outcome
//! enumeration, and the subprocess adapter used in production. Tests
//! substitute in-process fakes.

mod outcome;
mod process;

pub use outcome::PlannerOutcome;
pub use process::{DEFAULT_ENGINE_PROGRAM, ProcessEngine};

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Opaque handle to an engine-normalized planning task.
///
/// Produced by [`PlanningEngine::parse`]; the driver only ever hands it back
/// to the same engine for solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    /// Task artifact on disk, inside the job's scratch directory.
    pub path: PathBuf,
}

/// What the engine reports for one solve call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolveReport {
    pub status: PlannerOutcome,
    /// Plan action lines, one action per entry. Empty when no plan exists.
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub log_messages: Vec<String>,
}

/// A planning engine: parses a PDDL pair into a task, then attempts to solve
/// it with a named planner.
pub trait PlanningEngine {
    /// Normalize a domain/problem pair into a task artifact under `scratch`.
    fn parse(&self, domain: &Path, problem: &Path, scratch: &Path) -> Result<ParsedTask>;

    /// Run the named planner on a parsed task. A clean negative status
    /// (unsolvable, engine-side timeout) is an `Ok` report, not an error.
    fn solve(
        &self,
        task: &ParsedTask,
        planner_name: &str,
        planner_params: &serde_json::Value,
    ) -> Result<SolveReport>;
}
