use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::details::ExperimentDetails;
use crate::tasks::PlanningTask;

/// Canonical identity of a job. Also its dedup key and, through `Ord`, the
/// output ordering of everything the generator emits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct JobKey {
    pub planner_tag: String,
    pub domainname: String,
    pub instanceno: u32,
    pub ipc_year: String,
}

/// One concrete job: a planning task paired with a planner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Planner tag as derived from the configuration file stem.
    pub planner_tag: String,
    pub planner_cfg: PathBuf,
    pub task: PlanningTask,
}

impl Job {
    pub fn key(&self) -> JobKey {
        JobKey {
            planner_tag: self.planner_tag.clone(),
            domainname: self.task.domainname.clone(),
            instanceno: self.task.instanceno,
            ipc_year: self.task.ipc_year.clone(),
        }
    }

    /// Render the inner `solve` invocation.
    ///
    /// Flag order is part of the contract: equal jobs must render to
    /// byte-identical strings.
    pub fn solve_command(&self, details_file: &Path, run_dir: &Path, dump_dir: &Path) -> String {
        format!(
            "solve --domainname {} --instanceno {} --ipc-year {} --planner-cfg-file {} \
             --exp-details-dir {} --run-dir {} --domain {} --problem {} --results-dump-dir {}",
            self.task.domainname,
            self.task.instanceno,
            self.task.ipc_year,
            self.planner_cfg.display(),
            details_file.display(),
            run_dir.display(),
            self.task.domainfile.display(),
            self.task.problemfile.display(),
            dump_dir.display(),
        )
    }
}

/// Build the deduplicated job set: filtered tasks crossed with every
/// configured planner, keyed canonically.
///
/// The `selected-tasks` filter is opt-in: an empty list selects everything.
pub fn build_jobs(details: &ExperimentDetails, tasks: &[PlanningTask]) -> BTreeMap<JobKey, Job> {
    let selected = &details.settings.selected_tasks;
    let mut jobs = BTreeMap::new();
    for task in tasks {
        if !selected.is_empty() && !is_selected(selected, task) {
            continue;
        }
        for (tag, cfg) in &details.planners {
            let job = Job {
                planner_tag: tag.clone(),
                planner_cfg: cfg.clone(),
                task: task.clone(),
            };
            jobs.insert(job.key(), job);
        }
    }
    jobs
}

fn is_selected(selected: &[(String, String, u32)], task: &PlanningTask) -> bool {
    selected.iter().any(|(year, domain, instance)| {
        *year == task.ipc_year && *domain == task.domainname && *instance == task.instanceno
    })
}
