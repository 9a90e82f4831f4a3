//! I/O adapters for the tracker: config, manifests, run directories, reports.

pub mod artifact;
pub mod config;
pub mod mission;
pub mod report_store;
pub mod runs;
