//! Batch run orchestration from export source to output directory.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, RunOutcome};
