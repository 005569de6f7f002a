//! Experiment-level configuration.
//!
//! An experiment directory holds `exp-details.json` plus a `planners/`
//! subdirectory with one JSON configuration file per planner. The planner
//! tag used for scheduling artifacts is the configuration file's stem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Settings file expected inside the experiment directory.
pub const EXP_DETAILS_FILE: &str = "exp-details.json";
const PLANNERS_DIR: &str = "planners";

/// Experiment description, loaded once per generation run.
#[derive(Debug, Clone)]
pub struct ExperimentDetails {
    pub settings: ExpSettings,
    /// Planner tag (config file stem) to configuration file path.
    pub planners: BTreeMap<String, PathBuf>,
    /// Path of the settings file itself; threaded into generated commands.
    pub details_file: PathBuf,
}

/// Contents of `exp-details.json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExpSettings {
    /// Inclusion filter of (year, domain, instance) triples. Empty or
    /// absent means no filter.
    #[serde(rename = "selected-tasks", default)]
    pub selected_tasks: Vec<(String, String, u32)>,
    /// Scheduler wall-clock limit, passed through verbatim.
    pub timelimit: String,
    /// Scheduler memory limit, passed through verbatim.
    pub memorylimit: String,
}

/// One planner's configuration file. All three fields are required;
/// absence is a fatal configuration error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerConfig {
    #[serde(rename = "planner-tag")]
    pub planner_tag: String,
    /// Planner identifier understood by the external engine.
    #[serde(rename = "up-planner-name")]
    pub up_planner_name: String,
    /// Opaque parameter bag forwarded verbatim to the engine.
    #[serde(rename = "planner-params")]
    pub planner_params: serde_json::Value,
}

/// Load the experiment description from a directory.
///
/// Fails when `exp-details.json` or the `planners/` subdirectory is missing.
pub fn load_experiment(dir: &Path) -> Result<ExperimentDetails> {
    let details_file = dir.join(EXP_DETAILS_FILE);
    if !details_file.exists() {
        bail!(
            "experiment details file not found: {}",
            details_file.display()
        );
    }
    let contents = fs::read_to_string(&details_file)
        .with_context(|| format!("read {}", details_file.display()))?;
    let settings: ExpSettings = serde_json::from_str(&contents)
        .with_context(|| format!("parse {}", details_file.display()))?;

    let planners_dir = dir.join(PLANNERS_DIR);
    if !planners_dir.exists() {
        bail!("planners directory not found: {}", planners_dir.display());
    }
    let mut planners = BTreeMap::new();
    for entry in
        fs::read_dir(&planners_dir).with_context(|| format!("read {}", planners_dir.display()))?
    {
        let entry = entry.context("read planner entry")?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let tag = planner_tag_from_path(&path)?;
        planners.insert(tag, path);
    }

    Ok(ExperimentDetails {
        settings,
        planners,
        details_file,
    })
}

/// Planner tag derived from a configuration file path (the file stem).
pub fn planner_tag_from_path(path: &Path) -> Result<String> {
    match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => bail!("no usable planner tag in {}", path.display()),
    }
}

/// Load one planner configuration.
pub fn load_planner_config(path: &Path) -> Result<PlannerConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PlannerConfig =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_experiment(dir: &Path, details: &str) {
        fs::write(dir.join(EXP_DETAILS_FILE), details).expect("write details");
        fs::create_dir_all(dir.join(PLANNERS_DIR)).expect("planners dir");
    }

    #[test]
    fn loads_settings_and_planner_map() {
        let temp = tempdir().expect("tempdir");
        write_experiment(
            temp.path(),
            r#"{"selected-tasks": [["2011", "elevators", 3]], "timelimit": "1:00:00", "memorylimit": "8G"}"#,
        );
        fs::write(temp.path().join("planners/enhsp-sat.json"), "{}").expect("planner file");
        fs::write(temp.path().join("planners/notes.txt"), "ignored").expect("stray file");

        let details = load_experiment(temp.path()).expect("load");
        assert_eq!(details.settings.timelimit, "1:00:00");
        assert_eq!(details.settings.memorylimit, "8G");
        assert_eq!(
            details.settings.selected_tasks,
            vec![("2011".to_string(), "elevators".to_string(), 3)]
        );
        assert_eq!(details.planners.len(), 1);
        assert!(details.planners.contains_key("enhsp-sat"));
    }

    #[test]
    fn absent_selected_tasks_defaults_to_empty() {
        let temp = tempdir().expect("tempdir");
        write_experiment(
            temp.path(),
            r#"{"timelimit": "1:00:00", "memorylimit": "8G"}"#,
        );
        let details = load_experiment(temp.path()).expect("load");
        assert!(details.settings.selected_tasks.is_empty());
    }

    #[test]
    fn missing_details_file_is_fatal() {
        let temp = tempdir().expect("tempdir");
        let err = load_experiment(temp.path()).expect_err("missing details");
        assert!(err.to_string().contains(EXP_DETAILS_FILE));
    }

    #[test]
    fn missing_planners_dir_is_fatal() {
        let temp = tempdir().expect("tempdir");
        fs::write(
            temp.path().join(EXP_DETAILS_FILE),
            r#"{"timelimit": "1", "memorylimit": "1G"}"#,
        )
        .expect("write details");
        let err = load_experiment(temp.path()).expect_err("missing planners");
        assert!(err.to_string().contains("planners"));
    }

    #[test]
    fn planner_config_requires_all_fields() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("enhsp-sat.json");
        fs::write(
            &path,
            r#"{"planner-tag": "enhsp-sat", "up-planner-name": "enhsp"}"#,
        )
        .expect("write config");
        let err = load_planner_config(&path).expect_err("missing planner-params");
        assert!(format!("{err:#}").contains("planner-params"));
    }

    #[test]
    fn planner_config_round_trips() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("fd-lama.json");
        fs::write(
            &path,
            r#"{"planner-tag": "fd-lama", "up-planner-name": "fast-downward", "planner-params": {"alias": "lama-first"}}"#,
        )
        .expect("write config");
        let cfg = load_planner_config(&path).expect("load");
        assert_eq!(cfg.planner_tag, "fd-lama");
        assert_eq!(cfg.up_planner_name, "fast-downward");
        assert_eq!(cfg.planner_params["alias"], "lama-first");
    }
}
