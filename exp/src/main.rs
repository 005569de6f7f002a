//! Experiment pipeline CLI for automated-planning benchmarks.
//!
//! Three stages, run as independent processes: `generate` turns an
//! experiment description plus a task corpus into scheduler-ready job
//! scripts, `solve` executes exactly one (task, planner) job against the
//! planning engine, and `analyze` folds the accumulated result and error
//! records into two summary reports.

mod analyze;
mod cli;
mod details;
mod generate;
mod jobs;
mod logging;
mod record;
mod slurm;
mod solve;
mod tasks;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::analyze::AnalyzeArgs;
use crate::generate::GenerateArgs;
use crate::solve::SolveArgs;

#[derive(Parser)]
#[command(
    name = "exp",
    version,
    about = "Experiment pipeline for planning benchmarks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate job invocation lines and SLURM batch scripts.
    Generate(GenerateArgs),
    /// Run one (task, planner) job and record its result or error.
    Solve(SolveArgs),
    /// Aggregate result and error records into summary reports.
    Analyze(AnalyzeArgs),
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => cli::generate(&args),
        Command::Solve(args) => cli::solve(&args),
        Command::Analyze(args) => cli::analyze(&args),
    }
}
