//! Deterministic, pure logic shared by the tracker.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod enforcer;
pub mod error;
pub mod gate;
pub mod registry;
pub mod simulator;
pub mod strategy;
pub mod triage;
pub mod types;
