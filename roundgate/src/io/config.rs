//! Tracker configuration stored in `roundgate.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::registry::{DEFAULT_REQUIRED, TaskRegistry};
use crate::io::artifact::{Manifest, ManifestEntry};
use crate::io::mission::load_mission;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "roundgate.toml";

/// Tasks of the stock ten-round QA cycle.
const DEFAULT_TASKS: [&str; 7] = [
    "gear_module_styling",
    "cross_module_navigation",
    "top_nav_module_visibility",
    "jobs_studio_firm_access",
    "manage_firm_functionality",
    "route_optimizer_completion",
    "total_loss_module_completion",
];

/// How task progress is measured each round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Simulate,
    Artifacts,
}

/// Tracker configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to the stock
/// ten-round cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Upper bound on rounds before forced completion.
    pub max_rounds: u32,

    pub strategy: StrategyKind,

    /// Seed for simulated increments; `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Where to write the final JSON report, if anywhere.
    pub report_path: Option<PathBuf>,

    pub tasks: Vec<TaskConfig>,

    pub artifacts: ArtifactsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskConfig {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory expected paths are resolved against.
    pub base_dir: PathBuf,

    /// Optional `mission.json`, relative to `base_dir`.
    pub mission: Option<PathBuf>,

    pub manifest: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryConfig {
    pub category: String,
    pub paths: Vec<String>,
}

fn default_required() -> u32 {
    DEFAULT_REQUIRED
}

fn default_tasks() -> Vec<TaskConfig> {
    DEFAULT_TASKS
        .iter()
        .map(|name| TaskConfig {
            name: (*name).to_string(),
            required: DEFAULT_REQUIRED,
        })
        .collect()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            mission: None,
            manifest: Vec::new(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            strategy: StrategyKind::Simulate,
            seed: None,
            report_path: None,
            tasks: Vec::new(),
            artifacts: ArtifactsConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Defaults with the stock tasks spelled out, for `roundgate init`.
    pub fn starter() -> Self {
        Self {
            tasks: default_tasks(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(anyhow!("max_rounds must be > 0"));
        }
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                return Err(anyhow!("task names must be non-empty"));
            }
            if !seen.insert(task.name.as_str()) {
                return Err(anyhow!("duplicate task '{}'", task.name));
            }
            if task.required > 100 {
                return Err(anyhow!(
                    "task '{}': required must be within 0..=100",
                    task.name
                ));
            }
        }
        for category in &self.artifacts.manifest {
            if category.category.trim().is_empty() {
                return Err(anyhow!("artifacts.manifest: category must be non-empty"));
            }
        }
        Ok(())
    }

    /// Manifest declared inline under `[[artifacts.manifest]]`.
    pub fn inline_manifest(&self) -> Manifest {
        Manifest::new(
            self.artifacts
                .manifest
                .iter()
                .flat_map(|category| {
                    category.paths.iter().map(|path| ManifestEntry {
                        category: category.category.clone(),
                        expected_path: path.clone(),
                    })
                })
                .collect(),
        )
    }

    /// Full artifact manifest: the mission file's deliverables (if configured)
    /// followed by the inline entries.
    pub fn resolve_manifest(&self) -> Result<Manifest> {
        let mut entries = Vec::new();
        if let Some(mission) = &self.artifacts.mission {
            let mission = load_mission(&self.artifacts.base_dir.join(mission))?;
            entries.extend(mission.manifest()?.entries().iter().cloned());
        }
        entries.extend(self.inline_manifest().entries().iter().cloned());
        Ok(Manifest::new(entries))
    }

    /// Build the registry from `[[tasks]]`. Without configured tasks, the
    /// simulator gets the stock tasks and artifact mode gets one task per
    /// manifest category.
    pub fn build_registry(&self, manifest: &Manifest) -> Result<TaskRegistry> {
        let mut registry = TaskRegistry::new();
        match (self.tasks.is_empty(), self.strategy) {
            (false, _) => {
                for task in &self.tasks {
                    registry.register(&task.name, task.required)?;
                }
            }
            (true, StrategyKind::Simulate) => {
                for task in default_tasks() {
                    registry.register(&task.name, task.required)?;
                }
            }
            (true, StrategyKind::Artifacts) => {
                for category in manifest.categories() {
                    registry.register(category, DEFAULT_REQUIRED)?;
                }
            }
        }
        if registry.is_empty() {
            return Err(anyhow!("no tasks configured and manifest is empty"));
        }
        Ok(registry)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TrackerConfig::default()`.
pub fn load_config(path: &Path) -> Result<TrackerConfig> {
    if !path.exists() {
        let cfg = TrackerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TrackerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TrackerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
