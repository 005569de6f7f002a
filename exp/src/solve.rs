//! Single-job execution driver.
//!
//! Runs exactly one (task, planner) pair against the engine and persists
//! exactly one record: a result on success or on a clean negative status, an
//! error otherwise. Individual job failures never propagate; a batch of
//! independent jobs must survive any one of them.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use engine::{DEFAULT_ENGINE_PROGRAM, PlanningEngine};

use crate::details::{self, PlannerConfig};
use crate::record::{
    self, DebugInfo, PlannerInfo, ResultRecord, TaskInfo, TaskResult, TaskSummary, Timings,
};

/// CLI arguments for `solve`.
#[derive(Debug, Args)]
pub struct SolveArgs {
    /// Planner configuration file.
    #[arg(long)]
    pub planner_cfg_file: PathBuf,
    /// Experiment details file this job was generated from (provenance
    /// only; never read by the driver).
    #[arg(long)]
    pub exp_details_dir: PathBuf,
    /// Domain PDDL file.
    #[arg(long)]
    pub domain: PathBuf,
    /// Problem PDDL file.
    #[arg(long)]
    pub problem: PathBuf,
    #[arg(long)]
    pub domainname: String,
    #[arg(long)]
    pub instanceno: String,
    #[arg(long)]
    pub ipc_year: String,
    /// Directory hosting per-job scratch space.
    #[arg(long)]
    pub run_dir: PathBuf,
    /// Directory receiving result records.
    #[arg(long)]
    pub results_dump_dir: PathBuf,
    /// Planning-engine executable.
    #[arg(long, default_value = DEFAULT_ENGINE_PROGRAM)]
    pub engine_bin: PathBuf,
}

/// Which record the driver wrote.
#[derive(Debug)]
pub enum SolveOutcome {
    Result { status: &'static str, path: PathBuf },
    Error { path: PathBuf },
}

/// Run one job to a single persisted record.
///
/// Any failure on the way is data, not a process failure: it is written as
/// an error record and the function still returns `Ok`.
#[instrument(skip_all, fields(domain = %args.domainname, instance = %args.instanceno))]
pub fn run_solve(engine: &dyn PlanningEngine, args: &SolveArgs) -> Result<SolveOutcome> {
    let cfg = details::load_planner_config(&args.planner_cfg_file);
    // The error key needs a planner tag even when the config is unreadable;
    // the config file stem stands in for it then.
    let tag = match &cfg {
        Ok(cfg) => cfg.planner_tag.clone(),
        Err(_) => details::planner_tag_from_path(&args.planner_cfg_file)
            .unwrap_or_else(|_| "unknown".to_string()),
    };

    match cfg.and_then(|cfg| execute(engine, args, cfg)) {
        Ok((status, path)) => {
            info!(status, record = %path.display(), "job finished");
            Ok(SolveOutcome::Result { status, path })
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "job failed, recording error");
            let key = record::record_key(&tag, &args.domainname, &args.instanceno, &args.ipc_year);
            let path = record::write_error(&args.results_dump_dir, &key, &format!("{err:#}"))?;
            Ok(SolveOutcome::Error { path })
        }
    }
}

fn execute(
    engine: &dyn PlanningEngine,
    args: &SolveArgs,
    cfg: PlannerConfig,
) -> Result<(&'static str, PathBuf)> {
    let scratch = TempDir::new_in(&args.run_dir)
        .with_context(|| format!("create scratch dir in {}", args.run_dir.display()))?;

    let parse_started = Instant::now();
    let task = engine
        .parse(&args.domain, &args.problem, scratch.path())
        .context("parse planning task")?;
    let pddl_parse_time = parse_started.elapsed().as_secs_f64();
    debug!(pddl_parse_time, "task parsed");

    let solve_started = Instant::now();
    let report = engine
        .solve(&task, &cfg.up_planner_name, &cfg.planner_params)
        .context("invoke planner engine")?;
    let planning_time = solve_started.elapsed().as_secs_f64();
    debug!(planning_time, status = report.status.name(), "engine returned");

    // A plan is only kept for positive statuses; a clean negative outcome
    // records an empty one.
    let plan = if report.status.is_positive() {
        report.plan
    } else {
        Vec::new()
    };

    let result = ResultRecord {
        task_info: TaskInfo {
            domain: args.domainname.clone(),
            instance: args.instanceno.clone(),
            ipc_year: args.ipc_year.clone(),
        },
        planner_info: PlannerInfo {
            planner_tag: cfg.planner_tag,
            planner_name: cfg.up_planner_name,
            planner_params: cfg.planner_params,
        },
        task_result: TaskResult {
            timings: Timings {
                pddl_parse_time,
                planning_time,
            },
            summary: TaskSummary {
                status: report.status.name().to_string(),
                log_messages: report.log_messages,
            },
            plan,
        },
        debug_info: DebugInfo {
            domain_file: args.domain.display().to_string(),
            problem_file: args.problem.display().to_string(),
        },
    };

    let path = record::write_result(&args.results_dump_dir, &result)?;
    Ok((report.status.name(), path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use engine::{ParsedTask, PlannerOutcome, SolveReport};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct FakeEngine {
        status: PlannerOutcome,
        plan: Vec<String>,
        fail_with: Option<&'static str>,
    }

    impl FakeEngine {
        fn solved(plan: &[&str]) -> Self {
            Self {
                status: PlannerOutcome::SolvedSatisficing,
                plan: plan.iter().map(|s| s.to_string()).collect(),
                fail_with: None,
            }
        }

        fn status(status: PlannerOutcome) -> Self {
            Self {
                status,
                plan: Vec::new(),
                fail_with: None,
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                status: PlannerOutcome::InternalError,
                plan: Vec::new(),
                fail_with: Some(message),
            }
        }
    }

    impl PlanningEngine for FakeEngine {
        fn parse(&self, _domain: &Path, _problem: &Path, scratch: &Path) -> Result<ParsedTask> {
            Ok(ParsedTask {
                path: scratch.join("task.json"),
            })
        }

        fn solve(
            &self,
            _task: &ParsedTask,
            _planner_name: &str,
            _planner_params: &serde_json::Value,
        ) -> Result<SolveReport> {
            if let Some(message) = self.fail_with {
                bail!("{message}");
            }
            Ok(SolveReport {
                status: self.status,
                plan: self.plan.clone(),
                log_messages: vec!["engine log".to_string()],
            })
        }
    }

    fn solve_args(temp: &Path) -> SolveArgs {
        let run_dir = temp.join("planners_run");
        fs::create_dir_all(&run_dir).expect("run dir");
        let cfg_path = temp.join("enhsp-sat.json");
        fs::write(
            &cfg_path,
            r#"{"planner-tag": "enhsp-sat", "up-planner-name": "enhsp", "planner-params": {"h": "hadd"}}"#,
        )
        .expect("planner config");
        SolveArgs {
            planner_cfg_file: cfg_path,
            exp_details_dir: temp.join("exp-details.json"),
            domain: temp.join("domain.pddl"),
            problem: temp.join("p01.pddl"),
            domainname: "elevators".to_string(),
            instanceno: "1".to_string(),
            ipc_year: "2008".to_string(),
            run_dir,
            results_dump_dir: temp.join("dump_results"),
            engine_bin: PathBuf::from(DEFAULT_ENGINE_PROGRAM),
        }
    }

    fn error_dir(args: &SolveArgs) -> PathBuf {
        args.results_dump_dir.join("..").join(record::ERRORS_DIR)
    }

    #[test]
    fn positive_outcome_writes_result_with_plan() {
        let temp = tempdir().expect("tempdir");
        let args = solve_args(temp.path());
        let engine = FakeEngine::solved(&["(up a)", "(down b)"]);

        let outcome = run_solve(&engine, &args).expect("solve");
        let SolveOutcome::Result { status, path } = outcome else {
            panic!("expected result record");
        };
        assert_eq!(status, "SOLVED_SATISFICING");

        let record = record::read_result(&path).expect("read record");
        assert_eq!(record.task_info.domain, "elevators");
        assert_eq!(record.planner_info.planner_tag, "enhsp-sat");
        assert_eq!(record.task_result.plan.len(), 2);
        assert_eq!(record.task_result.summary.status, "SOLVED_SATISFICING");
        assert!(record.task_result.timings.planning_time >= 0.0);
        assert!(!error_dir(&args).exists());
    }

    #[test]
    fn clean_negative_status_is_a_result_with_empty_plan() {
        let temp = tempdir().expect("tempdir");
        let args = solve_args(temp.path());
        let engine = FakeEngine::status(PlannerOutcome::UnsolvableProven);

        let outcome = run_solve(&engine, &args).expect("solve");
        let SolveOutcome::Result { status, path } = outcome else {
            panic!("expected result record");
        };
        assert_eq!(status, "UNSOLVABLE_PROVEN");

        let record = record::read_result(&path).expect("read record");
        assert!(record.task_result.plan.is_empty());
        assert!(!error_dir(&args).exists());
    }

    #[test]
    fn engine_failure_writes_error_and_no_result() {
        let temp = tempdir().expect("tempdir");
        let args = solve_args(temp.path());
        let engine = FakeEngine::failing("TimeoutError");

        let outcome = run_solve(&engine, &args).expect("solve still succeeds");
        let SolveOutcome::Error { path } = outcome else {
            panic!("expected error record");
        };
        assert!(path.ends_with("errors/enhsp-sat-elevators-1-2008.error"));
        let message = fs::read_to_string(&path).expect("read error");
        assert!(message.contains("TimeoutError"));

        let result_path = args
            .results_dump_dir
            .join("enhsp-sat-elevators-1-2008.json");
        assert!(!result_path.exists());
    }

    #[test]
    fn unreadable_config_falls_back_to_file_stem_key() {
        let temp = tempdir().expect("tempdir");
        let args = solve_args(temp.path());
        fs::write(&args.planner_cfg_file, "{ not json").expect("corrupt config");
        let engine = FakeEngine::solved(&[]);

        let outcome = run_solve(&engine, &args).expect("solve still succeeds");
        let SolveOutcome::Error { path } = outcome else {
            panic!("expected error record");
        };
        assert!(path.ends_with("errors/enhsp-sat-elevators-1-2008.error"));
    }

    #[test]
    fn missing_run_dir_becomes_an_error_record() {
        let temp = tempdir().expect("tempdir");
        let mut args = solve_args(temp.path());
        args.run_dir = temp.path().join("no_such_dir");
        let engine = FakeEngine::solved(&[]);

        let outcome = run_solve(&engine, &args).expect("solve still succeeds");
        assert!(matches!(outcome, SolveOutcome::Error { .. }));
    }
}
