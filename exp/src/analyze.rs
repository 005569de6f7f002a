//! Result and error aggregation: the `analyze` subcommand.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument};

use engine::PlannerOutcome;

use crate::record::{self, ResultRecord};

/// CLI arguments for `analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Directory holding the result records.
    #[arg(long)]
    pub dump_results_dir: PathBuf,
    /// Directory holding the error records.
    #[arg(long)]
    pub error_logs_dir: PathBuf,
}

/// Paths of the two written reports.
#[derive(Debug)]
pub struct AnalysisReports {
    pub run_summary: PathBuf,
    pub error_summary: PathBuf,
}

/// Per-planner aggregate over all of its result records.
#[derive(Debug, Serialize, PartialEq)]
pub struct PlannerSummary {
    /// Distinct (year, domain, instance) triples covered.
    #[serde(rename = "instances-count")]
    pub instances_count: usize,
    pub unsolvable: usize,
    pub solvable: usize,
    #[serde(rename = "total-unsolvable-planning-time")]
    pub total_unsolvable_planning_time: f64,
    #[serde(rename = "total-solvable-planning-time")]
    pub total_solvable_planning_time: f64,
    #[serde(rename = "average-unsolvable-planning-time")]
    pub average_unsolvable_planning_time: f64,
    #[serde(rename = "average-solvable-planning-time")]
    pub average_solvable_planning_time: f64,
}

/// Aggregate both record namespaces and write the two reports under
/// `<parent of dump-results-dir>/analysis/`.
#[instrument(skip_all)]
pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalysisReports> {
    if !args.dump_results_dir.exists() {
        bail!(
            "results directory not found: {}",
            args.dump_results_dir.display()
        );
    }
    if !args.error_logs_dir.exists() {
        bail!(
            "error logs directory not found: {}",
            args.error_logs_dir.display()
        );
    }

    let run_summary = summarize_runs(&args.dump_results_dir)?;
    let error_summary = summarize_errors(&args.error_logs_dir)?;
    debug!(
        planners = run_summary.len(),
        distinct_errors = error_summary.len(),
        "aggregation complete"
    );

    let analysis_dir = args
        .dump_results_dir
        .parent()
        .unwrap_or(Path::new(""))
        .join("analysis");
    fs::create_dir_all(&analysis_dir)
        .with_context(|| format!("create {}", analysis_dir.display()))?;

    let run_summary_path = analysis_dir.join("run_summary.json");
    write_report(&run_summary_path, &run_summary)?;
    let error_summary_path = analysis_dir.join("error_summary.json");
    write_report(&error_summary_path, &error_summary)?;

    Ok(AnalysisReports {
        run_summary: run_summary_path,
        error_summary: error_summary_path,
    })
}

/// Group result records by planner tag and fold each group's statistics.
pub fn summarize_runs(results_dir: &Path) -> Result<BTreeMap<String, PlannerSummary>> {
    let mut groups: BTreeMap<String, Vec<ResultRecord>> = BTreeMap::new();
    for path in sorted_files_with_ext(results_dir, record::RESULT_EXT)? {
        let rec = record::read_result(&path)?;
        groups
            .entry(rec.planner_info.planner_tag.clone())
            .or_default()
            .push(rec);
    }

    let mut summary = BTreeMap::new();
    for (tag, records) in groups {
        summary.insert(tag, summarize_group(&records));
    }
    Ok(summary)
}

fn summarize_group(records: &[ResultRecord]) -> PlannerSummary {
    let instances = records
        .iter()
        .map(|r| {
            format!(
                "{}-{}-{}",
                r.task_info.ipc_year, r.task_info.domain, r.task_info.instance
            )
        })
        .collect::<BTreeSet<_>>();
    let unsolvable = planning_times(records, PlannerOutcome::UnsolvableIncompletely.name());
    let solvable = planning_times(records, PlannerOutcome::SolvedSatisficing.name());

    PlannerSummary {
        instances_count: instances.len(),
        unsolvable: unsolvable.len(),
        solvable: solvable.len(),
        total_unsolvable_planning_time: round3(unsolvable.iter().sum()),
        total_solvable_planning_time: round3(solvable.iter().sum()),
        average_unsolvable_planning_time: mean3(&unsolvable),
        average_solvable_planning_time: mean3(&solvable),
    }
}

fn planning_times(records: &[ResultRecord], status: &str) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.task_result.summary.status == status)
        .map(|r| r.task_result.timings.planning_time)
        .collect()
}

/// Arithmetic mean rounded to 3 decimals; `-1` sentinel for an empty subset.
fn mean3(values: &[f64]) -> f64 {
    if values.is_empty() {
        return -1.0;
    }
    round3(values.iter().sum::<f64>() / values.len() as f64)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Inverted index from literal error-line text to the files containing it.
pub fn summarize_errors(error_dir: &Path) -> Result<BTreeMap<String, Vec<String>>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in sorted_files_with_ext(error_dir, record::ERROR_EXT)? {
        let contents =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        for line in contents.lines() {
            index
                .entry(line.to_string())
                .or_default()
                .push(file_name.to_string());
        }
    }
    Ok(index)
}

fn sorted_files_with_ext(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(report).context("serialize report")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
