//! Bounded round loop: verify, gate, repeat, and force completion on exhaustion.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::enforcer::enforce;
use crate::core::gate::check;
use crate::core::registry::TaskRegistry;
use crate::core::strategy::VerificationStrategy;
use crate::core::types::{
    AuditEntry, RoundContext, RoundState, RoundSummary, RunOutcome, TaskStatus,
};

/// Final report of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub rounds_executed: u32,
    pub max_rounds: u32,
    /// Strategy label (`simulate` or `artifacts`).
    pub strategy: String,
    /// Final per-task progress, registration order.
    pub tasks: Vec<TaskStatus>,
    pub rounds: Vec<RoundSummary>,
    /// One entry per forced task; empty when the gate passed on its own.
    pub audit: Vec<AuditEntry>,
    /// RFC 3339 timestamp taken when the run finished.
    pub finished_at: String,
}

impl RunReport {
    pub fn forced(&self) -> bool {
        self.outcome == RunOutcome::ForcedComplete
    }
}

/// Drives at most `max_rounds` rounds of one verification strategy.
#[derive(Debug)]
pub struct RoundOrchestrator<S: VerificationStrategy> {
    strategy: S,
    max_rounds: u32,
}

impl<S: VerificationStrategy> RoundOrchestrator<S> {
    pub fn new(strategy: S, max_rounds: u32) -> Result<Self> {
        if max_rounds == 0 {
            return Err(anyhow!("max_rounds must be > 0"));
        }
        Ok(Self {
            strategy,
            max_rounds,
        })
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Run rounds until the gate passes or the budget is exhausted, then
    /// force any remaining tasks.
    ///
    /// `on_round` sees every round summary as soon as it is gated. Any
    /// registry or strategy error stops the run immediately.
    #[instrument(skip_all, fields(strategy = self.strategy.name(), max_rounds = self.max_rounds, tasks = registry.len()))]
    pub fn run<F: FnMut(&RoundSummary)>(
        &mut self,
        registry: &mut TaskRegistry,
        mut on_round: F,
    ) -> Result<RunReport> {
        let mut rounds: Vec<RoundSummary> = Vec::new();
        let mut state = RoundState::Running(1);

        let (outcome, audit) = loop {
            match state {
                RoundState::Running(index) => {
                    let summary = self
                        .run_round(registry, index)
                        .with_context(|| format!("round {index}"))?;
                    let passed = summary.gate.all_complete;
                    on_round(&summary);
                    rounds.push(summary);
                    state = next_state(index, self.max_rounds, passed);
                }
                RoundState::Passed => {
                    info!(rounds = rounds.len(), "quality gate passed");
                    break (RunOutcome::PassedWithinBudget, Vec::new());
                }
                RoundState::ExhaustedRounds => {
                    let audit = enforce(registry, self.max_rounds)
                        .context("force remaining tasks")?;
                    warn!(
                        forced = audit.len(),
                        rounds = rounds.len(),
                        "round budget exhausted; remaining tasks forced to completion"
                    );
                    break (RunOutcome::ForcedComplete, audit);
                }
            }
        };

        let rounds_executed =
            u32::try_from(rounds.len()).context("round count exceeds u32")?;
        Ok(RunReport {
            outcome,
            rounds_executed,
            max_rounds: self.max_rounds,
            strategy: self.strategy.name().to_string(),
            tasks: registry.statuses(),
            rounds,
            audit,
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Evaluate every task, commit the round as one batch, then gate it.
    fn run_round(&mut self, registry: &mut TaskRegistry, index: u32) -> Result<RoundSummary> {
        let ctx = RoundContext::new(index);
        debug!(round = index, phase = %ctx.phase, "round started");

        let mut updates = Vec::with_capacity(registry.len());
        for task in registry.get_all() {
            let value = self
                .strategy
                .evaluate(task, &ctx)
                .with_context(|| format!("evaluate task '{}'", task.name))?;
            updates.push((task.name.clone(), value));
        }
        registry.apply_round(&updates)?;

        let gate = check(registry);
        info!(
            round = index,
            phase = %ctx.phase,
            incomplete = gate.incomplete_tasks.len(),
            passed = gate.all_complete,
            "round gated"
        );
        Ok(RoundSummary {
            index,
            phase: ctx.phase,
            tasks: registry.statuses(),
            gate,
        })
    }
}

/// Transition after a gated round.
pub fn next_state(index: u32, max_rounds: u32, passed: bool) -> RoundState {
    if passed {
        RoundState::Passed
    } else if index >= max_rounds {
        RoundState::ExhaustedRounds
    } else {
        RoundState::Running(index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TrackerError;
    use crate::core::registry::Task;
    use crate::core::simulator::{FixedIncrement, ProgressSimulator};
    use crate::test_support::{ScriptedStrategy, registry_with};

    #[test]
    fn next_state_covers_every_transition() {
        assert_eq!(next_state(1, 10, false), RoundState::Running(2));
        assert_eq!(next_state(4, 10, true), RoundState::Passed);
        assert_eq!(next_state(10, 10, false), RoundState::ExhaustedRounds);
        assert_eq!(next_state(10, 10, true), RoundState::Passed);
    }

    #[test]
    fn zero_round_budget_is_rejected() {
        let err = RoundOrchestrator::new(ProgressSimulator::new(FixedIncrement(10)), 0)
            .expect_err("zero rounds");
        assert!(err.to_string().contains("max_rounds"));
    }

    #[test]
    fn stops_on_first_passing_round() {
        let mut registry = registry_with(&[("a", 100), ("b", 100)]);
        let mut seen = Vec::new();
        let report = RoundOrchestrator::new(ProgressSimulator::new(FixedIncrement(50)), 10)
            .expect("orchestrator")
            .run(&mut registry, |summary| seen.push(summary.index))
            .expect("run");

        assert_eq!(report.outcome, RunOutcome::PassedWithinBudget);
        assert_eq!(report.rounds_executed, 2);
        assert_eq!(seen, vec![1, 2]);
        assert!(report.audit.is_empty());
        assert!(!report.forced());
    }

    #[test]
    fn empty_registry_passes_in_first_round() {
        let mut registry = TaskRegistry::new();
        let report = RoundOrchestrator::new(ProgressSimulator::new(FixedIncrement(1)), 3)
            .expect("orchestrator")
            .run(&mut registry, |_| {})
            .expect("run");
        assert_eq!(report.outcome, RunOutcome::PassedWithinBudget);
        assert_eq!(report.rounds_executed, 1);
    }

    #[test]
    fn strategy_errors_fail_the_run_without_partial_commit() {
        let mut registry = registry_with(&[("a", 100), ("b", 100)]);
        let strategy = ScriptedStrategy::new(vec![
            Ok(20),
            Err(TrackerError::ManifestNotFound {
                category: "b".to_string(),
            }),
        ]);
        let err = RoundOrchestrator::new(strategy, 5)
            .expect("orchestrator")
            .run(&mut registry, |_| {})
            .expect_err("strategy failure");

        assert_eq!(
            err.downcast_ref::<TrackerError>(),
            Some(&TrackerError::ManifestNotFound {
                category: "b".to_string()
            })
        );
        assert_eq!(registry.get("a").map(|task: &Task| task.progress), Some(0));
    }

    #[test]
    fn regressing_strategy_is_fatal() {
        let mut registry = registry_with(&[("a", 100)]);
        let strategy = ScriptedStrategy::new(vec![Ok(60), Ok(40)]);
        let err = RoundOrchestrator::new(strategy, 5)
            .expect("orchestrator")
            .run(&mut registry, |_| {})
            .expect_err("regression");
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::InvalidProgress {
                current: 60,
                attempted: 40,
                ..
            })
        ));
    }
}
