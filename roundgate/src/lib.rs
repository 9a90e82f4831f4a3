//! Bounded-round task completion tracker with a quality gate.
//!
//! A fixed set of tasks is driven through at most `max_rounds` rounds. Each
//! round a verification strategy measures progress and a quality gate decides
//! pass/fail; the loop stops on the first pass. When the budget runs out, the
//! remaining tasks are forced to completion and every forced task is audited.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (registry, gate, enforcer,
//!   simulator, triage). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, mission manifests,
//!   artifact checks, run directories, report files).
//!
//! Orchestration modules ([`orchestrator`], [`check`], [`report`]) combine core
//! logic with I/O to implement CLI commands.
//!
//! The registry is not internally synchronized; share it across threads only
//! behind external serialization.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod orchestrator;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
