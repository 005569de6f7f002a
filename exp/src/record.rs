//! Result and error records: the driver's on-disk contract.
//!
//! One file per job, keyed `{planner-tag}-{domain}-{instance}-{year}`.
//! Results are JSON under the dump directory; errors are plain text under
//! the sibling `errors/` directory. A second write to the same key replaces
//! the first.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File extension for result records.
pub const RESULT_EXT: &str = "json";
/// File extension for error records.
pub const ERROR_EXT: &str = "error";
/// Error namespace, a sibling of the results dump directory.
pub const ERRORS_DIR: &str = "errors";

/// Everything recorded for one successfully driven job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    #[serde(rename = "task-info")]
    pub task_info: TaskInfo,
    #[serde(rename = "planner-info")]
    pub planner_info: PlannerInfo,
    #[serde(rename = "task-result")]
    pub task_result: TaskResult,
    #[serde(rename = "debug-info")]
    pub debug_info: DebugInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInfo {
    pub domain: String,
    pub instance: String,
    #[serde(rename = "ipc-year")]
    pub ipc_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannerInfo {
    #[serde(rename = "planner-tag")]
    pub planner_tag: String,
    #[serde(rename = "planner-name")]
    pub planner_name: String,
    #[serde(rename = "planner-params")]
    pub planner_params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    #[serde(default)]
    pub timings: Timings,
    pub summary: TaskSummary,
    #[serde(default)]
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timings {
    /// Wall-clock seconds spent parsing the PDDL pair.
    #[serde(rename = "pddl-parse-time", default)]
    pub pddl_parse_time: f64,
    /// Wall-clock seconds spent in the solve call.
    #[serde(rename = "planning-time", default)]
    pub planning_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSummary {
    pub status: String,
    #[serde(default)]
    pub log_messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebugInfo {
    #[serde(rename = "domain-file")]
    pub domain_file: String,
    #[serde(rename = "problem-file")]
    pub problem_file: String,
}

/// Record key shared by the result and error namespaces.
pub fn record_key(planner_tag: &str, domain: &str, instance: &str, year: &str) -> String {
    format!("{planner_tag}-{domain}-{instance}-{year}")
}

impl ResultRecord {
    pub fn key(&self) -> String {
        record_key(
            &self.planner_info.planner_tag,
            &self.task_info.domain,
            &self.task_info.instance,
            &self.task_info.ipc_year,
        )
    }
}

/// Write a result record under the dump directory, creating it if needed.
pub fn write_result(dump_dir: &Path, record: &ResultRecord) -> Result<PathBuf> {
    fs::create_dir_all(dump_dir).with_context(|| format!("create {}", dump_dir.display()))?;
    let path = dump_dir.join(format!("{}.{RESULT_EXT}", record.key()));
    let contents = serde_json::to_string_pretty(record).context("serialize result record")?;
    fs::write(&path, format!("{contents}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Write an error record into the error namespace next to the dump
/// directory.
pub fn write_error(dump_dir: &Path, key: &str, message: &str) -> Result<PathBuf> {
    let error_dir = dump_dir.join("..").join(ERRORS_DIR);
    fs::create_dir_all(&error_dir).with_context(|| format!("create {}", error_dir.display()))?;
    let path = error_dir.join(format!("{key}.{ERROR_EXT}"));
    fs::write(&path, format!("{message}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn read_result(path: &Path) -> Result<ResultRecord> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}
