//! Per-frame transforms: geometric zoom, pixel filters, and tone remapping.
//!
//! All transforms preserve frame dimensions and always produce three-channel
//! output, so stages can be chained in any configuration without renegotiating
//! the stream geometry.

pub mod filter;
pub mod stage;
pub mod tone;
pub mod zoom;

pub use stage::FramePipeline;
