use thiserror::Error;

/// Main error type for the FrameWise pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot open source video for decode: {path}")]
    SourceUnreadable { path: String },

    #[error("decode failed: {reason}")]
    DecodeFailed { reason: String },

    #[error("encode failed: {reason}")]
    EncodeFailed { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// Out-of-range parameters are rejected here, before a run starts, rather
/// than discovered mid-decode.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value} (allowed: {allowed})")]
    OutOfRange {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("invalid trim window: start {start}s must not exceed end {end}s")]
    InvalidTrimWindow { start: f64, end: f64 },

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse configuration file: {path}")]
    ParseFailed { path: String },
}

/// Convenience type alias for Results using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Get a user-friendly error message for the status sink
    pub fn user_message(&self) -> String {
        match self {
            Self::SourceUnreadable { path } => {
                format!(
                    "Could not open '{}' for decoding. Please check the file exists and is a supported video format.",
                    path
                )
            }
            Self::EncodeFailed { reason } => {
                format!("Encoding the output video failed: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}
