//! Evidence-based verification: completion is the share of expected files
//! that exist on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::TrackerError;
use crate::core::registry::Task;
use crate::core::strategy::VerificationStrategy;
use crate::core::types::RoundContext;

/// One expected artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub category: String,
    pub expected_path: String,
}

/// Expected artifacts, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category.as_str()) {
                seen.push(entry.category.as_str());
            }
        }
        seen
    }

    pub fn paths_for(&self, category: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .map(|entry| entry.expected_path.as_str())
            .collect()
    }
}

/// Per-path existence for one category at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub category: String,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl CategoryProgress {
    pub fn expected(&self) -> usize {
        self.present.len() + self.missing.len()
    }

    /// `round(100 * present / expected)`, rounding halves up.
    pub fn percent(&self) -> u32 {
        ratio_percent(self.present.len(), self.expected())
    }
}

/// Integer percentage with halves rounded up; an empty total counts as 0.
pub fn ratio_percent(present: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (200 * present + total) / (2 * total);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Verifies a task by checking the files listed for the category named after it.
///
/// Existence only; contents are never read. Re-evaluating without filesystem
/// changes returns the same value.
#[derive(Debug, Clone)]
pub struct ArtifactVerifier {
    base_dir: PathBuf,
    manifest: Manifest,
}

impl ArtifactVerifier {
    pub fn new(base_dir: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            base_dir: base_dir.into(),
            manifest,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Check every expected path of `category`.
    pub fn inspect(&self, category: &str) -> Result<CategoryProgress, TrackerError> {
        let paths = self.manifest.paths_for(category);
        if paths.is_empty() {
            return Err(TrackerError::ManifestNotFound {
                category: category.to_string(),
            });
        }
        let mut progress = CategoryProgress {
            category: category.to_string(),
            present: Vec::new(),
            missing: Vec::new(),
        };
        for path in paths {
            if self.exists(category, path) {
                progress.present.push(path.to_string());
            } else {
                progress.missing.push(path.to_string());
            }
        }
        Ok(progress)
    }

    /// An expected path counts if it exists under the category directory,
    /// directly under the base directory, or as a bare file name in the
    /// category directory. Absolute paths are checked as-is.
    fn exists(&self, category: &str, expected: &str) -> bool {
        let expected = Path::new(expected);
        if expected.is_absolute() {
            return expected.exists();
        }
        let category_dir = self.base_dir.join(category);
        category_dir.join(expected).exists()
            || self.base_dir.join(expected).exists()
            || expected
                .file_name()
                .is_some_and(|file_name| category_dir.join(file_name).exists())
    }
}

impl VerificationStrategy for ArtifactVerifier {
    fn evaluate(&mut self, task: &Task, ctx: &RoundContext) -> Result<u32, TrackerError> {
        let progress = self.inspect(&task.name)?;
        let percent = progress.percent();
        debug!(
            task = %task.name,
            round = ctx.index,
            present = progress.present.len(),
            expected = progress.expected(),
            percent,
            "verified artifacts"
        );
        Ok(percent)
    }

    fn name(&self) -> &'static str {
        "artifacts"
    }
}
