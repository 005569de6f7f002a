//! Job generation: orchestration behind the `generate` subcommand.
//!
//! Produces the sandbox skeleton, the `generated_cmds.sh` invocation list,
//! and one batch script per job. Nothing is submitted to the scheduler.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info, instrument};

use crate::details;
use crate::jobs;
use crate::slurm;
use crate::tasks;

/// Binary invoked by every generated command line.
const MAIN_ENTRY: &str = "exp";

/// CLI arguments for `generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Directory holding exp-details.json and the planners/ subdirectory.
    #[arg(long)]
    pub exp_details_dir: PathBuf,
    /// Root of the planning-task corpus.
    #[arg(long)]
    pub planning_tasks_dir: PathBuf,
    /// Sandbox directory receiving all generated files and run outputs.
    #[arg(long)]
    pub sandbox_dir: PathBuf,
    /// Virtual environment to activate around each job.
    #[arg(long, conflicts_with = "apptainer_image")]
    pub venv_dir: Option<PathBuf>,
    /// Apptainer image to run each job in.
    #[arg(long)]
    pub apptainer_image: Option<PathBuf>,
}

/// What `generate` produced, for the CLI summary line.
#[derive(Debug)]
pub struct GenerateSummary {
    pub jobs: usize,
    pub cmds_file: PathBuf,
    pub scripts_dir: PathBuf,
}

/// Directory skeleton inside the sandbox.
#[derive(Debug)]
struct SandboxLayout {
    generated_cmds_dir: PathBuf,
    planners_run_dir: PathBuf,
    dump_results_dir: PathBuf,
    slurm_scripts_dir: PathBuf,
}

impl SandboxLayout {
    fn create(sandbox_dir: &Path) -> Result<Self> {
        let generated_cmds_dir = sandbox_dir.join("generated_cmds");
        let layout = Self {
            planners_run_dir: sandbox_dir.join("planners_run"),
            dump_results_dir: sandbox_dir.join("dump_results"),
            slurm_scripts_dir: generated_cmds_dir.join("slurm_scripts"),
            generated_cmds_dir,
        };
        for dir in [
            &layout.generated_cmds_dir,
            &layout.planners_run_dir,
            &layout.dump_results_dir,
            &layout.slurm_scripts_dir,
        ] {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(layout)
    }
}

/// Generate the full job set for an experiment.
#[instrument(skip_all, fields(sandbox = %args.sandbox_dir.display()))]
pub fn run_generate(args: &GenerateArgs) -> Result<GenerateSummary> {
    let layout = SandboxLayout::create(&args.sandbox_dir)?;

    let details =
        details::load_experiment(&args.exp_details_dir).context("load experiment details")?;
    debug!(planners = details.planners.len(), "experiment details loaded");

    let tasks =
        tasks::discover_tasks(&args.planning_tasks_dir).context("discover planning tasks")?;
    debug!(tasks = tasks.len(), "planning tasks discovered");

    let jobs = jobs::build_jobs(&details, &tasks);
    info!(jobs = jobs.len(), "job set generated");

    let mut lines = Vec::with_capacity(jobs.len());
    for job in jobs.values() {
        let cmd = job.solve_command(
            &details.details_file,
            &layout.planners_run_dir,
            &layout.dump_results_dir,
        );
        lines.push(wrap_invocation(args, &cmd));
    }

    let cmds_file = layout.generated_cmds_dir.join("generated_cmds.sh");
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(&cmds_file, contents).with_context(|| format!("write {}", cmds_file.display()))?;

    for (index, (job, line)) in jobs.values().zip(&lines).enumerate() {
        let script = slurm::render_batch_script(
            job,
            line,
            &details.settings.timelimit,
            &details.settings.memorylimit,
            &layout.slurm_scripts_dir,
        );
        let path = layout
            .slurm_scripts_dir
            .join(format!("slurm_batch_task_{index}.txt"));
        fs::write(&path, script).with_context(|| format!("write {}", path.display()))?;
    }

    Ok(GenerateSummary {
        jobs: jobs.len(),
        cmds_file,
        scripts_dir: layout.slurm_scripts_dir,
    })
}

/// Wrap the inner command with the execution-environment activation.
fn wrap_invocation(args: &GenerateArgs, cmd: &str) -> String {
    if let Some(venv_dir) = &args.venv_dir {
        format!(
            "source {}/bin/activate && {MAIN_ENTRY} {cmd} && deactivate",
            venv_dir.display()
        )
    } else if let Some(image) = &args.apptainer_image {
        format!(
            "apptainer run --cleanenv --bind {}:/app/sandbox_dir {} {cmd}",
            args.sandbox_dir.display(),
            image.display()
        )
    } else {
        format!("{MAIN_ENTRY} {cmd}")
    }
}
