//! Read-only quality gate over the task registry.

use crate::core::registry::TaskRegistry;
use crate::core::types::GateResult;

/// Pass iff every task has reached its threshold.
///
/// `incomplete_tasks` keeps registration order so repeated checks render the
/// same report.
pub fn check(registry: &TaskRegistry) -> GateResult {
    let incomplete_tasks: Vec<String> = registry
        .get_all()
        .iter()
        .filter(|task| !task.is_complete())
        .map(|task| task.name.clone())
        .collect();
    GateResult {
        all_complete: incomplete_tasks.is_empty(),
        incomplete_tasks,
    }
}
