//! Test-only helpers: registries, manifests, run directories, scripted strategies.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

use crate::core::error::TrackerError;
use crate::core::registry::{Task, TaskRegistry};
use crate::core::strategy::VerificationStrategy;
use crate::core::types::RoundContext;
use crate::io::artifact::{Manifest, ManifestEntry};
use crate::io::mission::MISSION_FILE;

/// Registry with `(name, required)` tasks registered in order.
pub fn registry_with(tasks: &[(&str, u32)]) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    for (name, required) in tasks {
        registry
            .register(name, *required)
            .expect("test task should register");
    }
    registry
}

/// Manifest from `(category, paths)` pairs.
pub fn manifest(categories: &[(&str, &[&str])]) -> Manifest {
    Manifest::new(
        categories
            .iter()
            .flat_map(|(category, paths)| {
                paths.iter().map(|path| ManifestEntry {
                    category: (*category).to_string(),
                    expected_path: (*path).to_string(),
                })
            })
            .collect(),
    )
}

/// Create an empty file, including parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, "").expect("touch file");
}

/// Create `runs_dir/<id>/mission.json` and return the run directory.
pub fn write_run(runs_dir: &Path, id: &str, goal: &str, deliverables: &[(&str, &[&str])]) -> PathBuf {
    let run_dir = runs_dir.join(id);
    fs::create_dir_all(&run_dir).expect("create run dir");
    let mut map = serde_json::Map::new();
    for (category, paths) in deliverables {
        map.insert((*category).to_string(), json!(paths));
    }
    let mission = json!({
        "goal": goal,
        "deliverables": map,
        "acceptance": ["all deliverables present"],
    });
    let mut buf = serde_json::to_string_pretty(&mission).expect("serialize mission");
    buf.push('\n');
    fs::write(run_dir.join(MISSION_FILE), buf).expect("write mission");
    run_dir
}

/// Temporary runs root for integration tests.
pub struct TempRuns {
    dir: tempfile::TempDir,
}

impl TempRuns {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp runs dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.dir.path().join("runs")
    }

    pub fn add_run(&self, id: &str, goal: &str, deliverables: &[(&str, &[&str])]) -> PathBuf {
        write_run(&self.runs_dir(), id, goal, deliverables)
    }
}

/// Strategy that replays queued results in call order.
///
/// Once the queue is empty every further call returns the task's current
/// progress unchanged.
pub struct ScriptedStrategy {
    results: VecDeque<Result<u32, TrackerError>>,
}

impl ScriptedStrategy {
    pub fn new(results: Vec<Result<u32, TrackerError>>) -> Self {
        Self {
            results: results.into(),
        }
    }
}

impl VerificationStrategy for ScriptedStrategy {
    fn evaluate(&mut self, task: &Task, _ctx: &RoundContext) -> Result<u32, TrackerError> {
        self.results
            .pop_front()
            .unwrap_or(Ok(u32::from(task.progress)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
