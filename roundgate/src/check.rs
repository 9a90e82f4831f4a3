//! One-shot deliverable check for a run directory.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::io::artifact::{ArtifactVerifier, CategoryProgress};
use crate::io::mission::load_run_mission;

/// Width of the text progress bar.
pub const BAR_WIDTH: usize = 30;

/// Deliverable status of a run, category by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub run_id: String,
    pub goal: String,
    pub categories: Vec<CategoryProgress>,
    pub acceptance: Vec<String>,
    pub present: usize,
    pub expected: usize,
}

impl CheckReport {
    pub fn percent(&self) -> f64 {
        if self.expected == 0 {
            return 0.0;
        }
        self.present as f64 * 100.0 / self.expected as f64
    }

    pub fn is_complete(&self) -> bool {
        self.expected > 0 && self.present == self.expected
    }
}

/// Inspect every deliverable listed in the run's `mission.json`.
pub fn check_run(run_dir: &Path) -> Result<CheckReport> {
    let mission = load_run_mission(run_dir)?;
    let manifest = mission.manifest()?;
    let verifier = ArtifactVerifier::new(run_dir, manifest);

    let mut categories = Vec::new();
    for category in verifier.manifest().categories() {
        let progress = verifier
            .inspect(category)
            .with_context(|| format!("inspect category '{category}'"))?;
        categories.push(progress);
    }
    let present = categories.iter().map(|c| c.present.len()).sum();
    let expected = categories.iter().map(CategoryProgress::expected).sum();

    Ok(CheckReport {
        run_id: run_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| run_dir.display().to_string()),
        goal: mission.goal,
        categories,
        acceptance: mission.acceptance,
        present,
        expected,
    })
}

/// Filled/empty cells for `present` out of `expected`, `BAR_WIDTH` wide.
pub fn progress_bar(present: usize, expected: usize) -> String {
    let filled = if expected == 0 {
        0
    } else {
        (BAR_WIDTH * present / expected).min(BAR_WIDTH)
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Status line for a completion percentage.
pub fn progress_tier(percent: f64) -> &'static str {
    if percent >= 100.0 {
        "Complete: every deliverable is present."
    } else if percent >= 75.0 {
        "Almost there: final deliverables outstanding."
    } else if percent >= 50.0 {
        "Good progress: more than half delivered."
    } else if percent >= 25.0 {
        "Getting started: early deliverables in place."
    } else {
        "Just started: most deliverables missing."
    }
}
