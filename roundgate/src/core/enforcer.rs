//! Forced completion after the round budget runs out.

use tracing::warn;

use crate::core::error::TrackerError;
use crate::core::registry::TaskRegistry;
use crate::core::types::AuditEntry;

/// Force every incomplete task to its threshold, one audit entry per task.
///
/// A forced task means the evidence never caught up; it should be read as
/// "needs manual follow-up", not as a genuine pass. Calling this again once
/// everything is complete yields an empty list.
pub fn enforce(
    registry: &mut TaskRegistry,
    round_index: u32,
) -> Result<Vec<AuditEntry>, TrackerError> {
    let pending: Vec<String> = registry
        .get_all()
        .iter()
        .filter(|task| !task.is_complete())
        .map(|task| task.name.clone())
        .collect();

    let mut audit = Vec::with_capacity(pending.len());
    for name in pending {
        let previous_progress = registry.force_complete(&name)?;
        let forced_to = registry
            .get(&name)
            .map(|task| task.progress)
            .ok_or_else(|| TrackerError::UnknownTask { name: name.clone() })?;
        warn!(
            task = %name,
            previous_progress,
            forced_to,
            round_index,
            "task forced to completion"
        );
        audit.push(AuditEntry {
            task_name: name,
            previous_progress,
            forced_to,
            round_index,
        });
    }
    Ok(audit)
}
