//! Stable exit codes for roundgate CLI commands.

/// Command succeeded; for `run`, the quality gate passed within budget.
pub const OK: i32 = 0;
/// Command failed due to invalid config, manifest, or other errors.
pub const INVALID: i32 = 1;
/// `roundgate run` finished only because remaining tasks were forced.
pub const FORCED: i32 = 2;
