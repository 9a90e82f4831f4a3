//! Mission manifest (`mission.json`) load with schema + semantic validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::io::artifact::{Manifest, ManifestEntry};

const MISSION_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/mission/v1.schema.json"
));

/// File name of the mission manifest inside a run directory.
pub const MISSION_FILE: &str = "mission.json";

/// Declared goal, deliverables per category, and acceptance criteria.
///
/// `deliverables` keeps the category order of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub goal: String,
    pub deliverables: serde_json::Map<String, Value>,
    #[serde(default)]
    pub acceptance: Vec<String>,
}

impl Mission {
    /// Flatten deliverables into manifest entries, category by category.
    pub fn manifest(&self) -> Result<Manifest> {
        let mut entries = Vec::new();
        for (category, items) in &self.deliverables {
            let paths: Vec<String> = serde_json::from_value(items.clone())
                .with_context(|| format!("deliverables for '{category}'"))?;
            entries.extend(paths.into_iter().map(|expected_path| ManifestEntry {
                category: category.clone(),
                expected_path,
            }));
        }
        Ok(Manifest::new(entries))
    }
}

/// Load and validate a mission manifest (schema + invariants).
pub fn load_mission(path: &Path) -> Result<Mission> {
    debug!(path = %path.display(), "loading mission");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read mission {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse mission {}", path.display()))?;
    validate_schema(&value).with_context(|| format!("validate mission {}", path.display()))?;
    let mission: Mission = serde_json::from_value(value)
        .with_context(|| format!("deserialize mission {}", path.display()))?;
    let errors = validate_mission_invariants(&mission);
    if !errors.is_empty() {
        return Err(anyhow!(
            "mission invariants failed for {}: {}",
            path.display(),
            errors.join("; ")
        ));
    }
    Ok(mission)
}

/// Load `mission.json` from a run directory.
pub fn load_run_mission(run_dir: &Path) -> Result<Mission> {
    load_mission(&run_dir.join(MISSION_FILE))
}

fn validate_schema(mission: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(MISSION_SCHEMA).context("parse mission schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(mission) {
        let messages = compiled
            .iter_errors(mission)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "mission schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

/// Whitespace-only category names and paths, which pass the schema's
/// length checks.
fn validate_mission_invariants(mission: &Mission) -> Vec<String> {
    let mut errors = Vec::new();
    for (category, items) in &mission.deliverables {
        if category.trim().is_empty() {
            errors.push("category names must not be blank".to_string());
        }
        let blank_path = items
            .as_array()
            .is_some_and(|items| {
                items
                    .iter()
                    .any(|item| item.as_str().is_some_and(|path| path.trim().is_empty()))
            });
        if blank_path {
            errors.push(format!("{category}: deliverable paths must not be blank"));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join(MISSION_FILE);
        fs::write(&path, contents).expect("write mission");
        path
    }

    #[test]
    fn loads_mission_and_keeps_category_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write(
            temp.path(),
            r#"{
              "goal": "Ship the browser app",
              "deliverables": {
                "security": ["auth.js"],
                "frontend": ["index.html", "styles.css"],
                "backend": ["api.js"]
              },
              "acceptance": ["login works"]
            }"#,
        );

        let mission = load_mission(&path).expect("load");
        assert_eq!(mission.goal, "Ship the browser app");
        assert_eq!(mission.acceptance, vec!["login works".to_string()]);

        let manifest = mission.manifest().expect("manifest");
        assert_eq!(
            manifest.categories(),
            vec!["security", "frontend", "backend"]
        );
        assert_eq!(
            manifest.paths_for("frontend"),
            vec!["index.html", "styles.css"]
        );
    }

    #[test]
    fn rejects_schema_violations() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write(temp.path(), r#"{"deliverables": {"frontend": [1]}}"#);
        let err = load_mission(&path).expect_err("schema");
        assert!(format!("{err:#}").contains("mission schema validation failed"));
    }

    #[test]
    fn schema_rejects_empty_category_and_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        for contents in [
            r#"{"goal": "g", "deliverables": {"frontend": []}}"#,
            r#"{"goal": "g", "deliverables": {"frontend": [""]}}"#,
            r#"{"goal": "g", "deliverables": {"": ["a.html"]}}"#,
        ] {
            let path = write(temp.path(), contents);
            let err = load_mission(&path).expect_err("schema");
            assert!(
                format!("{err:#}").contains("mission schema validation failed"),
                "{contents}"
            );
        }
    }

    #[test]
    fn rejects_blank_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write(temp.path(), r#"{"goal": "g", "deliverables": {"frontend": ["  "]}}"#);
        let err = load_mission(&path).expect_err("invariants");
        assert!(format!("{err:#}").contains("frontend: deliverable paths must not be blank"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_run_mission(temp.path()).expect_err("missing");
        assert!(format!("{err:#}").contains("mission.json"));
    }
}
