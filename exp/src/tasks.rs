//! Planning-task discovery.
//!
//! Domain directories are found by walking the task corpus for `tasks.json`
//! descriptors: static JSON listing domain definitions with their problem
//! files. Every surviving (domain, problem) pair becomes one task.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

/// Descriptor file marking a domain directory.
pub const DESCRIPTOR_FILE: &str = "tasks.json";

/// Domain variants carrying this marker in their directory basename are
/// excluded from discovery.
const EXCLUDED_VARIANT_MARKER: &str = "adl";

/// One discovered (domain, problem-instance) planning task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningTask {
    pub domainname: String,
    /// 1-based position within the descriptor's problem list.
    pub instanceno: u32,
    pub ipc_year: String,
    pub domainfile: PathBuf,
    pub problemfile: PathBuf,
}

/// One domain definition inside a descriptor file.
#[derive(Debug, Deserialize)]
struct DomainDescriptor {
    name: String,
    ipc: String,
    /// (domain file, problem file) pairs, relative to the descriptor's
    /// directory.
    problems: Vec<(PathBuf, PathBuf)>,
}

/// Discover every planning task under `root`.
///
/// Directories sharing a basename dedup first-seen-wins in lexicographic
/// walk order. Tasks whose domain or problem file is missing are dropped
/// silently. A malformed descriptor is fatal.
pub fn discover_tasks(root: &Path) -> Result<Vec<PlanningTask>> {
    let mut tasks = Vec::new();
    let mut covered = HashSet::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.context("walk planning tasks directory")?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        let descriptor = dir.join(DESCRIPTOR_FILE);
        if !descriptor.exists() {
            continue;
        }
        let Some(basename) = dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if covered.contains(basename) {
            debug!(dir = %dir.display(), "duplicate domain basename, skipping");
            continue;
        }
        if basename.contains(EXCLUDED_VARIANT_MARKER) {
            continue;
        }
        covered.insert(basename.to_string());
        tasks.extend(load_domain_tasks(dir, &descriptor)?);
    }

    // Stable sort: equal domain names keep their walk order.
    tasks.sort_by(|left, right| left.domainname.cmp(&right.domainname));
    Ok(tasks)
}

fn load_domain_tasks(dir: &Path, descriptor: &Path) -> Result<Vec<PlanningTask>> {
    let contents =
        fs::read_to_string(descriptor).with_context(|| format!("read {}", descriptor.display()))?;
    let domains: Vec<DomainDescriptor> = serde_json::from_str(&contents)
        .with_context(|| format!("parse {}", descriptor.display()))?;
    // A descriptor may list several definitions; only the first is active.
    let Some(domain) = domains.first() else {
        bail!("no domain definitions in {}", descriptor.display());
    };

    let mut tasks = Vec::new();
    for (index, (domainfile, problemfile)) in domain.problems.iter().enumerate() {
        let task = PlanningTask {
            domainname: domain.name.clone(),
            instanceno: index as u32 + 1,
            ipc_year: domain.ipc.clone(),
            domainfile: dir.join(domainfile),
            problemfile: dir.join(problemfile),
        };
        if !(task.domainfile.exists() && task.problemfile.exists()) {
            debug!(
                domain = %task.domainname,
                instance = task.instanceno,
                "domain or problem file missing, dropping task"
            );
            continue;
        }
        tasks.push(task);
    }
    Ok(tasks)
}
