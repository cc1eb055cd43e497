//! Run orchestration: config validation, branch selection, the frame loop,
//! and progress reporting.

pub mod engine;

pub use engine::{PipelineEngine, RunSummary};
