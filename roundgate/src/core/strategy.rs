//! Verification strategy abstraction.
//!
//! The [`VerificationStrategy`] trait decouples the round loop from how
//! progress is measured. The simulator draws increments; the artifact verifier
//! (in `io`) counts files on disk. Tests use fixed increments so runs are
//! reproducible.

use crate::core::error::TrackerError;
use crate::core::registry::Task;
use crate::core::types::RoundContext;

/// Measures a task's completion value for the current round.
pub trait VerificationStrategy {
    /// Return the task's new progress. Values outside `current..=100` are
    /// rejected by the registry when the round is committed.
    fn evaluate(&mut self, task: &Task, ctx: &RoundContext) -> Result<u32, TrackerError>;

    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;
}

impl<S: VerificationStrategy + ?Sized> VerificationStrategy for &mut S {
    fn evaluate(&mut self, task: &Task, ctx: &RoundContext) -> Result<u32, TrackerError> {
        (**self).evaluate(task, ctx)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<S: VerificationStrategy + ?Sized> VerificationStrategy for Box<S> {
    fn evaluate(&mut self, task: &Task, ctx: &RoundContext) -> Result<u32, TrackerError> {
        (**self).evaluate(task, ctx)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
