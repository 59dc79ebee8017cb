//! Build orchestration and its sub-steps.
//!
//! - [`checksum`] - SHA256 calculation and verification
//! - [`orchestrator`] - [`BuildPipeline`] state machine and [`BuildHandle`]
//! - [`repackage`] - extraction, restructuring and re-archiving
//! - [`tool_detection`] - external tool availability checking

pub mod checksum;
mod orchestrator;
pub mod repackage;
pub mod tool_detection;

pub use orchestrator::{BuildHandle, BuildPipeline, BuildState};
