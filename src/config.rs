use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    timeline::TrimWindow,
};

/// Immutable snapshot of every enabled operation for one processing run.
///
/// Each optional operation is modeled as present-with-parameters or absent;
/// there are no separate "enabled" booleans. A config is captured once at run
/// start and never mutated while the run is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Temporal trim window, seconds
    pub trim: Option<TrimWindow>,

    /// Intra-frame zoom (crop+rescale or shrink+pad)
    pub zoom: Option<Zoom>,

    /// Final-output resolution scaling
    pub resize: Option<Resize>,

    /// Per-frame pixel filter
    pub filter: Option<FilterKind>,

    /// Brightness/contrast remap
    pub tone: Option<ToneAdjust>,

    /// Output quality/bitrate profile
    #[serde(default)]
    pub compression: CompressionLevel,

    /// Output container format
    #[serde(default)]
    pub container: Container,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            trim: None,
            zoom: None,
            resize: None,
            filter: None,
            tone: None,
            compression: CompressionLevel::default(),
            container: Container::default(),
        }
    }
}

impl ProcessingConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: ProcessingConfig =
            toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
                path: path.display().to_string(),
            })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed {
            path: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether any per-frame operation is enabled.
    ///
    /// This flag, not the visual emptiness of the edits, decides the
    /// processing branch: when false the source is re-encoded directly and no
    /// intermediate store is ever created.
    pub fn any_frame_op_active(&self) -> bool {
        self.trim.is_some()
            || self.zoom.is_some()
            || self.resize.is_some()
            || self.filter.is_some()
            || self.tone.is_some()
    }

    /// Validate all parameters before a run starts
    pub fn validate(&self) -> Result<()> {
        if let Some(trim) = &self.trim {
            if trim.start < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "trim.start",
                    value: trim.start.to_string(),
                    allowed: ">= 0",
                }
                .into());
            }
            if trim.end < trim.start {
                return Err(ConfigError::InvalidTrimWindow {
                    start: trim.start,
                    end: trim.end,
                }
                .into());
            }
        }

        if let Some(zoom) = &self.zoom {
            if !(Zoom::MIN_FACTOR..=Zoom::MAX_FACTOR).contains(&zoom.factor) {
                return Err(ConfigError::OutOfRange {
                    field: "zoom.factor",
                    value: zoom.factor.to_string(),
                    allowed: "0.1-3.0",
                }
                .into());
            }
        }

        if let Some(resize) = &self.resize {
            if !(Resize::MIN_FACTOR..=Resize::MAX_FACTOR).contains(&resize.factor) {
                return Err(ConfigError::OutOfRange {
                    field: "resize.factor",
                    value: resize.factor.to_string(),
                    allowed: "0.1-3.0",
                }
                .into());
            }
        }

        if let Some(FilterKind::Blur { kernel }) = &self.filter {
            if !(1..=31).contains(kernel) || kernel % 2 == 0 {
                return Err(ConfigError::OutOfRange {
                    field: "filter.kernel",
                    value: kernel.to_string(),
                    allowed: "odd integer 1-31",
                }
                .into());
            }
        }

        if let Some(tone) = &self.tone {
            if !(-100..=100).contains(&tone.brightness) {
                return Err(ConfigError::OutOfRange {
                    field: "tone.brightness",
                    value: tone.brightness.to_string(),
                    allowed: "-100 to 100",
                }
                .into());
            }
            if !(0.0..=3.0).contains(&tone.contrast) {
                return Err(ConfigError::OutOfRange {
                    field: "tone.contrast",
                    value: tone.contrast.to_string(),
                    allowed: "0.0-3.0",
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Intra-frame zoom factor.
///
/// Factors above 1.0 crop a centered region and rescale it back up; factors
/// below 1.0 shrink the image onto a black canvas. Distinct from [`Resize`],
/// which changes the final output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub factor: f64,
}

impl Zoom {
    pub const MIN_FACTOR: f64 = 0.1;
    pub const MAX_FACTOR: f64 = 3.0;

    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

/// Final-output resolution scale factor, applied after all per-frame work
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resize {
    pub factor: f64,
}

impl Resize {
    pub const MIN_FACTOR: f64 = 0.1;
    pub const MAX_FACTOR: f64 = 3.0;

    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

/// Per-frame pixel filter selection.
///
/// The caller-facing "none" maps to an absent filter, so a constructed
/// `FilterKind` always does real work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FilterKind {
    /// Luma conversion replicated back to three channels
    Gray,
    /// Square Gaussian smoothing kernel of side `kernel` (odd)
    Blur { kernel: u32 },
    /// Dual-threshold edge map replicated back to three channels
    Edge,
}

impl FilterKind {
    /// Build a blur filter, forcing an even kernel up to the next odd integer
    pub fn blur(kernel: u32) -> Self {
        Self::Blur {
            kernel: ensure_odd(kernel),
        }
    }
}

/// Force a kernel side length to be odd: even values step up to `k + 1`
pub fn ensure_odd(k: u32) -> u32 {
    if k % 2 == 0 {
        k + 1
    } else {
        k
    }
}

/// Affine brightness/contrast remap parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneAdjust {
    /// Additive offset, -100 to 100
    pub brightness: i32,

    /// Multiplicative gain, 0.0 to 3.0
    pub contrast: f32,
}

impl ToneAdjust {
    pub fn new(brightness: i32, contrast: f32) -> Self {
        Self {
            brightness,
            contrast,
        }
    }
}

/// Output quality/bitrate profile.
///
/// Fixed table: the CRF sets perceptual quality, the maxrate caps peak
/// bitrate (bufsize is set to the same value at encode time).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    /// Constant rate factor for the H.264 encoder (lower = higher quality)
    pub fn crf(&self) -> u32 {
        match self {
            Self::Low => 30,
            Self::Medium => 26,
            Self::High => 22,
        }
    }

    /// Peak bitrate cap in kbps
    pub fn maxrate_kbps(&self) -> u32 {
        match self {
            Self::Low => 1000,
            Self::Medium => 2000,
            Self::High => 4000,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Output container format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Mp4,
    Avi,
    Mkv,
}

impl Container {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mkv => "mkv",
        }
    }

    /// Derive the container from an output path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase()
            .as_str()
        {
            "mp4" => Some(Self::Mp4),
            "avi" => Some(Self::Avi),
            "mkv" => Some(Self::Mkv),
            _ => None,
        }
    }
}
