//! Typed failures raised by the tracking core.

use thiserror::Error;

/// Errors raised synchronously at the point of violation.
///
/// None of these are retried by the orchestrator: a malformed task set or a
/// misbehaving strategy fails the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("task '{name}' is already registered")]
    DuplicateTask { name: String },

    #[error("task '{name}' is not registered")]
    UnknownTask { name: String },

    #[error("invalid progress for task '{name}': {attempted} (current {current}, allowed {current}..=100)")]
    InvalidProgress {
        name: String,
        current: u8,
        attempted: u32,
    },

    #[error("invalid threshold for task '{name}': required {required} must be within 0..=100")]
    InvalidThreshold { name: String, required: u32 },

    #[error("manifest has no expected paths for category '{category}'")]
    ManifestNotFound { category: String },

    #[error("cannot classify issue '{label}'")]
    UnclassifiedIssue { label: String },
}
