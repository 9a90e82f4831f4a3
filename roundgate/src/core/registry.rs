//! Ordered task registry with enforced progress invariants.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::error::TrackerError;
use crate::core::types::{MAX_PROGRESS, TaskStatus};

/// Default completion threshold.
pub const DEFAULT_REQUIRED: u32 = 100;

/// A named unit of work tracked across rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub progress: u8,
    pub required: u8,
    /// Set once when the enforcer forced this task to `required`.
    pub forced: bool,
}

impl Task {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.required
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus {
            name: self.name.clone(),
            progress: self.progress,
            required: self.required,
            complete: self.is_complete(),
            forced: self.forced,
        }
    }
}

/// Tasks in registration order.
///
/// Progress is bounded to `0..=100` and never regresses; both rules are checked
/// here rather than left to callers. Not internally synchronized: callers
/// sharing a registry across threads must serialize access themselves.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with threshold `required` and progress 0.
    pub fn register(&mut self, name: &str, required: u32) -> Result<(), TrackerError> {
        if self.index.contains_key(name) {
            return Err(TrackerError::DuplicateTask {
                name: name.to_string(),
            });
        }
        let required = u8::try_from(required)
            .ok()
            .filter(|value| *value <= MAX_PROGRESS)
            .ok_or_else(|| TrackerError::InvalidThreshold {
                name: name.to_string(),
                required,
            })?;
        self.index.insert(name.to_string(), self.tasks.len());
        self.tasks.push(Task {
            name: name.to_string(),
            progress: 0,
            required,
            forced: false,
        });
        Ok(())
    }

    pub fn get_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&idx| &self.tasks[idx])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn set_progress(&mut self, name: &str, value: u32) -> Result<(), TrackerError> {
        let (idx, progress) = self.validate_update(name, value)?;
        self.tasks[idx].progress = progress;
        Ok(())
    }

    /// Validate every update first, then commit all of them.
    ///
    /// Either the whole batch is applied or the registry is left untouched.
    /// A name repeated in the batch is checked against its staged value, so
    /// progress cannot regress within one call.
    pub fn apply_round(&mut self, updates: &[(String, u32)]) -> Result<(), TrackerError> {
        let mut staged: HashMap<usize, u8> = HashMap::with_capacity(updates.len());
        for (name, value) in updates {
            let idx = self.position(name)?;
            let current = staged
                .get(&idx)
                .copied()
                .unwrap_or(self.tasks[idx].progress);
            let progress = checked_progress(name, current, *value)?;
            staged.insert(idx, progress);
        }
        for (idx, progress) in staged {
            self.tasks[idx].progress = progress;
        }
        Ok(())
    }

    /// Set `name` to its threshold and mark it forced.
    ///
    /// Returns the progress it had before. Tasks already at or above their
    /// threshold are left alone.
    pub fn force_complete(&mut self, name: &str) -> Result<u8, TrackerError> {
        let idx = self.position(name)?;
        let task = &mut self.tasks[idx];
        let previous = task.progress;
        if !task.is_complete() {
            task.progress = task.required;
            task.forced = true;
        }
        Ok(previous)
    }

    pub fn statuses(&self) -> Vec<TaskStatus> {
        self.tasks.iter().map(Task::status).collect()
    }

    fn position(&self, name: &str) -> Result<usize, TrackerError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TrackerError::UnknownTask {
                name: name.to_string(),
            })
    }

    fn validate_update(&self, name: &str, value: u32) -> Result<(usize, u8), TrackerError> {
        let idx = self.position(name)?;
        let progress = checked_progress(name, self.tasks[idx].progress, value)?;
        Ok((idx, progress))
    }
}

/// `value` as progress, if it lies within `current..=100`.
fn checked_progress(name: &str, current: u8, value: u32) -> Result<u8, TrackerError> {
    let invalid = || TrackerError::InvalidProgress {
        name: name.to_string(),
        current,
        attempted: value,
    };
    let progress = u8::try_from(value).map_err(|_| invalid())?;
    if progress > MAX_PROGRESS || progress < current {
        return Err(invalid());
    }
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_all_keeps_registration_order() {
        let mut registry = TaskRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(name, DEFAULT_REQUIRED).expect("register");
        }
        let names: Vec<&str> = registry
            .get_all()
            .iter()
            .map(|task| task.name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(registry.get_all().iter().all(|task| task.progress == 0));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TaskRegistry::new();
        registry.register("a", 100).expect("register");
        let err = registry.register("a", 80).expect_err("duplicate");
        assert_eq!(
            err,
            TrackerError::DuplicateTask {
                name: "a".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn threshold_above_bound_is_rejected() {
        let mut registry = TaskRegistry::new();
        let err = registry.register("a", 101).expect_err("threshold");
        assert!(matches!(err, TrackerError::InvalidThreshold { required: 101, .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn set_progress_on_unknown_task_fails() {
        let mut registry = TaskRegistry::new();
        let err = registry.set_progress("ghost", 10).expect_err("unknown");
        assert_eq!(
            err,
            TrackerError::UnknownTask {
                name: "ghost".to_string()
            }
        );
    }

    /// A regression from 40 to 30 is a strategy bug and must be refused.
    #[test]
    fn set_progress_rejects_regression() {
        let mut registry = TaskRegistry::new();
        registry.register("x", 100).expect("register");
        registry.set_progress("x", 40).expect("first update");
        let err = registry.set_progress("x", 30).expect_err("regression");
        assert_eq!(
            err,
            TrackerError::InvalidProgress {
                name: "x".to_string(),
                current: 40,
                attempted: 30,
            }
        );
        assert_eq!(registry.get("x").map(|task| task.progress), Some(40));
    }

    #[test]
    fn set_progress_rejects_values_above_bound() {
        let mut registry = TaskRegistry::new();
        registry.register("x", 100).expect("register");
        assert!(registry.set_progress("x", 101).is_err());
        assert!(registry.set_progress("x", 300).is_err());
        registry.set_progress("x", 100).expect("upper bound is allowed");
        registry.set_progress("x", 100).expect("same value is not a regression");
    }

    #[test]
    fn apply_round_is_all_or_nothing() {
        let mut registry = TaskRegistry::new();
        registry.register("a", 100).expect("register");
        registry.register("b", 100).expect("register");
        registry.set_progress("b", 50).expect("seed b");

        let err = registry
            .apply_round(&[("a".to_string(), 20), ("b".to_string(), 10)])
            .expect_err("b regresses");
        assert!(matches!(err, TrackerError::InvalidProgress { .. }));
        assert_eq!(registry.get("a").map(|task| task.progress), Some(0));

        registry
            .apply_round(&[("a".to_string(), 20), ("b".to_string(), 60)])
            .expect("valid batch");
        assert_eq!(registry.get("a").map(|task| task.progress), Some(20));
        assert_eq!(registry.get("b").map(|task| task.progress), Some(60));
    }

    #[test]
    fn apply_round_checks_repeated_names_against_staged_value() {
        let mut registry = TaskRegistry::new();
        registry.register("a", 100).expect("register");
        registry.set_progress("a", 40).expect("seed a");

        let err = registry
            .apply_round(&[("a".to_string(), 90), ("a".to_string(), 50)])
            .expect_err("second update regresses");
        assert_eq!(
            err,
            TrackerError::InvalidProgress {
                name: "a".to_string(),
                current: 90,
                attempted: 50,
            }
        );
        assert_eq!(registry.get("a").map(|task| task.progress), Some(40));

        registry
            .apply_round(&[("a".to_string(), 50), ("a".to_string(), 70)])
            .expect("increasing repeats are fine");
        assert_eq!(registry.get("a").map(|task| task.progress), Some(70));
    }

    #[test]
    fn force_complete_marks_only_incomplete_tasks() {
        let mut registry = TaskRegistry::new();
        registry.register("open", 90).expect("register");
        registry.register("done", 50).expect("register");
        registry.set_progress("open", 35).expect("progress");
        registry.set_progress("done", 70).expect("progress");

        assert_eq!(registry.force_complete("open"), Ok(35));
        assert_eq!(registry.force_complete("done"), Ok(70));

        let open = registry.get("open").expect("open");
        assert_eq!((open.progress, open.forced), (90, true));
        let done = registry.get("done").expect("done");
        assert_eq!((done.progress, done.forced), (70, false));
    }
}
