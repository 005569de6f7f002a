//! Subprocess adapter for the engine CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::{ParsedTask, PlanningEngine, SolveReport};

/// Engine entry point expected on `PATH` inside the activated run
/// environment.
pub const DEFAULT_ENGINE_PROGRAM: &str = "up-engine";

/// Drives the engine executable: `parse` normalizes a PDDL pair into a task
/// file, `solve` prints a [`SolveReport`] as JSON on stdout.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: PathBuf,
}

impl ProcessEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("run {} {:?}", self.program.display(), args))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} {} failed: {}",
                self.program.display(),
                args.first().map(String::as_str).unwrap_or(""),
                stderr.trim()
            );
        }
        Ok(output.stdout)
    }
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_PROGRAM)
    }
}

impl PlanningEngine for ProcessEngine {
    fn parse(&self, domain: &Path, problem: &Path, scratch: &Path) -> Result<ParsedTask> {
        let task_path = scratch.join("task.json");
        let args = vec![
            "parse".to_string(),
            "--domain".to_string(),
            domain.display().to_string(),
            "--problem".to_string(),
            problem.display().to_string(),
            "--output".to_string(),
            task_path.display().to_string(),
        ];
        self.run(&args)?;
        if !task_path.exists() {
            bail!(
                "engine parse produced no task file at {}",
                task_path.display()
            );
        }
        debug!(task = %task_path.display(), "task parsed");
        Ok(ParsedTask { path: task_path })
    }

    fn solve(
        &self,
        task: &ParsedTask,
        planner_name: &str,
        planner_params: &serde_json::Value,
    ) -> Result<SolveReport> {
        let params = serde_json::to_string(planner_params).context("serialize planner params")?;
        let args = vec![
            "solve".to_string(),
            "--task".to_string(),
            task.path.display().to_string(),
            "--planner".to_string(),
            planner_name.to_string(),
            "--params".to_string(),
            params,
        ];
        let stdout = self.run(&args)?;
        let report: SolveReport =
            serde_json::from_slice(&stdout).context("parse engine solve report")?;
        debug!(
            status = report.status.name(),
            actions = report.plan.len(),
            "solve report received"
        );
        Ok(report)
    }
}
