//! Final report persistence.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::orchestrator::RunReport;

/// Atomically write the report as pretty JSON (temp file + rename).
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    debug!(path = %path.display(), outcome = %report.outcome, "writing run report");
    let mut buf = serde_json::to_string_pretty(report).context("serialize run report")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

pub fn load_report(path: &Path) -> Result<RunReport> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read report {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse report {}", path.display()))
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp report {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulator::{FixedIncrement, ProgressSimulator};
    use crate::orchestrator::RoundOrchestrator;
    use crate::test_support::registry_with;

    #[test]
    fn report_survives_disk_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/report.json");

        let mut registry = registry_with(&[("a", 100), ("b", 100)]);
        let report = RoundOrchestrator::new(ProgressSimulator::new(FixedIncrement(30)), 2)
            .expect("orchestrator")
            .run(&mut registry, |_| {})
            .expect("run");

        write_report(&path, &report).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.ends_with('\n'));
        assert!(contents.contains("\"outcome\": \"FORCED_COMPLETE\""));
        assert_eq!(load_report(&path).expect("load"), report);
    }
}
