//! # FrameWise
//!
//! Deterministic single-pass video processing: trim, zoom, pixel filters,
//! tone remapping, and a compressed H.264/AAC re-encode, driven by external
//! ffmpeg processes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use framewise::{
//!     config::{FilterKind, ProcessingConfig},
//!     pipeline::PipelineEngine,
//!     progress::NullSink,
//!     timeline::TrimWindow,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = ProcessingConfig::default();
//! config.trim = Some(TrimWindow::new(2.0, 10.0));
//! config.filter = Some(FilterKind::Gray);
//!
//! let engine = PipelineEngine::new(config, Arc::new(NullSink));
//! let summary = engine.run("input.mp4", "output.mp4").await?;
//! println!("wrote {} frames", summary.frames_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`pipeline`] - Run orchestration and branch selection
//! - [`transform`] - Per-frame zoom, filter, and tone stages
//! - [`video`] - Probing, raw-frame decode, and encoding via ffmpeg
//! - [`timeline`] - Temporal trim decisions
//! - [`progress`] - Progress events and sinks
//! - [`config`] - Run configuration and validation

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod timeline;
pub mod transform;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::ProcessingConfig,
    error::{PipelineError, Result},
    pipeline::{PipelineEngine, RunSummary},
    progress::{ProgressEvent, ProgressSink},
};
