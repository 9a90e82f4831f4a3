//! Shared deterministic types for the tracking core.
//!
//! These types define stable contracts between core components and the report
//! layer. They carry no I/O and serialize in a fixed field order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound for every task's progress.
pub const MAX_PROGRESS: u8 = 100;

/// Bucket of rounds sharing one progress-increment range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initial,
    Core,
    Polish,
    Final,
}

impl Phase {
    /// Rounds 1-3 are initial, 4-6 core, 7-9 polish, everything after final.
    pub fn for_round(index: u32) -> Self {
        match index {
            0..=3 => Phase::Initial,
            4..=6 => Phase::Core,
            7..=9 => Phase::Polish,
            _ => Phase::Final,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::Core => "core",
            Phase::Polish => "polish",
            Phase::Final => "final",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-round context handed to a verification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundContext {
    /// 1-based round index.
    pub index: u32,
    pub phase: Phase,
}

impl RoundContext {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            phase: Phase::for_round(index),
        }
    }
}

/// Outcome of a quality gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub all_complete: bool,
    /// Names failing the threshold, in registration order.
    pub incomplete_tasks: Vec<String>,
}

/// One forced completion recorded by the enforcer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub task_name: String,
    pub previous_progress: u8,
    pub forced_to: u8,
    pub round_index: u32,
}

/// Snapshot of a single task for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub name: String,
    pub progress: u8,
    pub required: u8,
    pub complete: bool,
    #[serde(default)]
    pub forced: bool,
}

/// Structured record of one executed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub index: u32,
    pub phase: Phase,
    pub tasks: Vec<TaskStatus>,
    pub gate: GateResult,
}

/// Terminal outcome reported for a run. No other terminal states exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// The gate passed before the round budget ran out.
    PassedWithinBudget,
    /// The enforcer had to force at least the remaining tasks to completion.
    ForcedComplete,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::PassedWithinBudget => "PASSED_WITHIN_BUDGET",
            RunOutcome::ForcedComplete => "FORCED_COMPLETE",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Running(u32),
    Passed,
    ExhaustedRounds,
}
