//! Run directory discovery under a runs root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::io::mission::load_run_mission;

/// Default runs root, resolved against the working directory.
pub const DEFAULT_RUNS_DIR: &str = "runs";

/// A run directory and, when its mission is readable, the mission goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunListing {
    pub id: String,
    pub path: PathBuf,
    pub goal: Option<String>,
}

/// Subdirectories of `runs_dir`, sorted by name ascending.
fn run_dirs(runs_dir: &Path) -> Result<Vec<PathBuf>> {
    if !runs_dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(runs_dir).with_context(|| format!("read {}", runs_dir.display()))? {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// The run with the greatest directory name (run ids sort by time).
pub fn latest_run(runs_dir: &Path) -> Result<PathBuf> {
    let latest = run_dirs(runs_dir)?
        .pop()
        .ok_or_else(|| anyhow!("no runs found under {}", runs_dir.display()))?;
    debug!(run = %latest.display(), "selected latest run");
    Ok(latest)
}

/// Run directory for a `check` argument.
///
/// `None` picks the latest run. An argument that is not an existing path is
/// taken as a run id under `runs_dir`.
pub fn resolve_run(run: Option<&Path>, runs_dir: &Path) -> Result<PathBuf> {
    let Some(run) = run else {
        return latest_run(runs_dir);
    };
    if run.is_dir() {
        return Ok(run.to_path_buf());
    }
    let by_id = runs_dir.join(run);
    if by_id.is_dir() {
        debug!(run = %by_id.display(), "resolved run id");
        return Ok(by_id);
    }
    Err(anyhow!(
        "run {} not found (also looked in {})",
        run.display(),
        runs_dir.display()
    ))
}

/// All runs, newest first.
pub fn list_runs(runs_dir: &Path) -> Result<Vec<RunListing>> {
    let mut listings = Vec::new();
    for path in run_dirs(runs_dir)?.into_iter().rev() {
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let goal = match load_run_mission(&path) {
            Ok(mission) => Some(mission.goal),
            Err(err) => {
                debug!(run = %path.display(), error = %format!("{err:#}"), "mission unreadable");
                None
            }
        };
        listings.push(RunListing { id, path, goal });
    }
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_run;

    #[test]
    fn latest_run_picks_greatest_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        for id in ["run-20240101", "run-20240305", "run-20240210"] {
            fs::create_dir_all(temp.path().join(id)).expect("mkdir");
        }
        fs::write(temp.path().join("zzz-not-a-dir"), "").expect("file");

        let latest = latest_run(temp.path()).expect("latest");
        assert!(latest.ends_with("run-20240305"));
    }

    #[test]
    fn latest_run_errors_when_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = latest_run(&temp.path().join("runs")).expect_err("empty");
        assert!(err.to_string().contains("no runs found"));
    }

    #[test]
    fn resolve_run_accepts_paths_and_ids() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runs_dir = temp.path().join("runs");
        let older = write_run(&runs_dir, "run-1", "goal", &[("docs", &["a.md"])]);
        let newer = write_run(&runs_dir, "run-2", "goal", &[("docs", &["a.md"])]);

        assert_eq!(resolve_run(None, &runs_dir).expect("latest"), newer);
        assert_eq!(resolve_run(Some(&older), &runs_dir).expect("path"), older);
        assert_eq!(
            resolve_run(Some(Path::new("run-1")), &runs_dir).expect("id"),
            older
        );
        let err = resolve_run(Some(Path::new("run-9")), &runs_dir).expect_err("unknown");
        assert!(err.to_string().contains("run-9 not found"));
    }

    #[test]
    fn list_runs_is_newest_first_with_goals() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_run(temp.path(), "run-1", "first goal", &[("frontend", &["a.html"])]);
        write_run(temp.path(), "run-2", "second goal", &[("frontend", &["a.html"])]);
        fs::create_dir_all(temp.path().join("run-3")).expect("bare run");

        let listings = list_runs(temp.path()).expect("list");
        let ids: Vec<&str> = listings.iter().map(|run| run.id.as_str()).collect();
        assert_eq!(ids, vec!["run-3", "run-2", "run-1"]);
        assert_eq!(listings[0].goal, None);
        assert_eq!(listings[1].goal.as_deref(), Some("second goal"));
    }
}
