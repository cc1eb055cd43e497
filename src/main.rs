use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber;

use framewise::{
    config::{CompressionLevel, Container, FilterKind, ProcessingConfig, Resize, ToneAdjust, Zoom},
    pipeline::PipelineEngine,
    progress::{ConsoleSink, NullSink, ProgressSink},
    timeline::TrimWindow,
};

#[derive(Parser)]
#[command(
    name = "framewise",
    version,
    about = "Trim, zoom, filter, and re-encode video files in a single pass",
    long_about = "FrameWise decodes a video frame by frame, applies the enabled edits (trim, \
zoom, pixel filter, brightness/contrast) and re-encodes the result with the selected \
compression profile, carrying the original audio across."
)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file (.mp4, .avi or .mkv)
    #[arg(short, long)]
    output: PathBuf,

    /// Trim start time in seconds (requires --trim-end)
    #[arg(long)]
    trim_start: Option<f64>,

    /// Trim end time in seconds (requires --trim-start)
    #[arg(long)]
    trim_end: Option<f64>,

    /// Zoom factor, 0.1 to 3.0
    #[arg(short, long)]
    zoom: Option<f64>,

    /// Output resolution scale factor, 0.1 to 3.0
    #[arg(short, long)]
    resize: Option<f64>,

    /// Pixel filter to apply (none, gray, blur, edge)
    #[arg(short, long, default_value = "none")]
    filter: String,

    /// Blur kernel size, odd, 1 to 31 (even values round up)
    #[arg(long, default_value_t = 5)]
    blur_kernel: u32,

    /// Brightness offset, -100 to 100
    #[arg(short, long)]
    brightness: Option<i32>,

    /// Contrast gain, 0.0 to 3.0
    #[arg(long)]
    contrast: Option<f32>,

    /// Compression profile (low, medium, high)
    #[arg(long, default_value = "medium")]
    compression: String,

    /// Configuration file (optional, CLI flags override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn build_config(&self) -> Result<ProcessingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                ProcessingConfig::from_file(path)?
            }
            None => ProcessingConfig::default(),
        };

        match (self.trim_start, self.trim_end) {
            (Some(start), Some(end)) => config.trim = Some(TrimWindow::new(start, end)),
            (None, None) => {}
            _ => bail!("--trim-start and --trim-end must be given together"),
        }

        if let Some(factor) = self.zoom {
            config.zoom = Some(Zoom::new(factor));
        }
        if let Some(factor) = self.resize {
            config.resize = Some(Resize::new(factor));
        }

        match self.filter.as_str() {
            "none" => {}
            "gray" => config.filter = Some(FilterKind::Gray),
            "blur" => config.filter = Some(FilterKind::blur(self.blur_kernel)),
            "edge" => config.filter = Some(FilterKind::Edge),
            other => bail!("Unknown filter: {} (expected none, gray, blur or edge)", other),
        }

        if self.brightness.is_some() || self.contrast.is_some() {
            config.tone = Some(ToneAdjust::new(
                self.brightness.unwrap_or(0),
                self.contrast.unwrap_or(1.0),
            ));
        }

        config.compression = CompressionLevel::from_name(&self.compression)
            .ok_or_else(|| anyhow::anyhow!("Unknown compression profile: {}", self.compression))?;

        config.container = Container::from_path(&self.output).ok_or_else(|| {
            anyhow::anyhow!("Unsupported output extension (expected .mp4, .avi or .mkv)")
        })?;

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting FrameWise v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", cli.input);
    info!("Output: {:?}", cli.output);

    let config = cli.build_config()?;
    config.validate()?;

    let sink: Arc<dyn ProgressSink> = if cli.quiet {
        Arc::new(NullSink)
    } else {
        Arc::new(ConsoleSink::new())
    };

    let engine = PipelineEngine::new(config, sink);
    let summary = engine.run(&cli.input, &cli.output).await?;

    info!(
        "Done! {} frames written, output saved to: {}",
        summary.frames_written, summary.output_path
    );
    Ok(())
}
