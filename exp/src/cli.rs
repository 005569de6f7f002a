//! CLI command implementations.

use anyhow::Result;

use engine::ProcessEngine;

use crate::analyze::{self, AnalyzeArgs};
use crate::generate::{self, GenerateArgs};
use crate::solve::{self, SolveArgs, SolveOutcome};

/// Generate the job set and batch scripts for an experiment.
pub fn generate(args: &GenerateArgs) -> Result<()> {
    let summary = generate::run_generate(args)?;
    println!(
        "generate: jobs={} cmds={} scripts={}",
        summary.jobs,
        summary.cmds_file.display(),
        summary.scripts_dir.display()
    );
    Ok(())
}

/// Run one job. Per-job failures are recorded, never propagated, so the
/// process still exits 0 for them.
pub fn solve(args: &SolveArgs) -> Result<()> {
    let engine = ProcessEngine::new(&args.engine_bin);
    match solve::run_solve(&engine, args)? {
        SolveOutcome::Result { status, path } => {
            println!("solve: status={} record={}", status, path.display());
        }
        SolveOutcome::Error { path } => {
            println!("solve: status=error record={}", path.display());
        }
    }
    Ok(())
}

/// Aggregate records into the two summary reports.
pub fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let reports = analyze::run_analyze(args)?;
    println!(
        "analyze: run_summary={} error_summary={}",
        reports.run_summary.display(),
        reports.error_summary.display()
    );
    Ok(())
}
