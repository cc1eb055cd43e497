//! Video I/O: source probing, sequential raw-frame decode, the intermediate
//! store, and final-pass encoding, all through external ffmpeg processes.

pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod probe;

pub use decoder::FrameReader;
pub use encoder::IntermediateStore;
pub use frame::Frame;
pub use probe::SourceInfo;
