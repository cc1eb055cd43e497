use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::ProcessingConfig,
    error::Result,
    progress::{ProgressSink, ProgressTracker, RunStatus},
    timeline,
    transform::FramePipeline,
    video::{
        encoder::{self, IntermediateStore},
        probe, FrameReader,
    },
};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames_seen: u64,
    pub frames_written: u64,
    pub output_path: String,
    pub file_size: u64,
}

/// Orchestrates one processing run from source file to encoded output.
///
/// The config is captured at construction and never changes while a run is
/// in flight; one engine drives one run at a time.
pub struct PipelineEngine {
    config: ProcessingConfig,
    tracker: ProgressTracker,
}

impl PipelineEngine {
    pub fn new(config: ProcessingConfig, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            config,
            tracker: ProgressTracker::new(sink),
        }
    }

    /// Run the pipeline. Exactly one terminal status is reported: Succeeded
    /// after the output file is complete, Failed otherwise.
    pub async fn run<P: AsRef<Path>>(&self, input: P, output: P) -> Result<RunSummary> {
        self.tracker.status(RunStatus::Processing);

        match self.execute(input.as_ref(), output.as_ref()).await {
            Ok(summary) => {
                self.tracker.status(RunStatus::Succeeded);
                info!(
                    "run complete: {} frames in, {} written, {} bytes out",
                    summary.frames_seen, summary.frames_written, summary.file_size
                );
                Ok(summary)
            }
            Err(e) => {
                self.tracker.status(RunStatus::Failed(e.user_message()));
                Err(e)
            }
        }
    }

    async fn execute(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        self.config.validate()?;

        let source = probe::probe(input)?;
        info!(
            "source: {}x{} @ {:.3} fps, {} frames, {:.2}s",
            source.width, source.height, source.fps, source.total_frames, source.duration
        );

        if !self.config.any_frame_op_active() {
            return self.direct_reencode(input, output).await;
        }

        self.process_frames(input, output, &source).await
    }

    /// No per-frame operation is enabled: one re-encode pass, no
    /// intermediate store is ever created.
    async fn direct_reencode(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        info!("no frame operations enabled, re-encoding directly");
        self.tracker.indeterminate();

        let args =
            encoder::direct_reencode_args(input, output, self.config.compression);
        encoder::run_ffmpeg(args).await?;

        self.tracker.percent(100);
        self.summarize(output, 0, 0)
    }

    async fn process_frames(
        &self,
        input: &Path,
        output: &Path,
        source: &probe::SourceInfo,
    ) -> Result<RunSummary> {
        let mut reader = FrameReader::open(input, source)?;
        let mut store = IntermediateStore::create(source)?;
        let stage = FramePipeline::from_config(&self.config);

        let total = source.total_frames.max(1);
        let mut seen: u64 = 0;
        let mut written: u64 = 0;

        while let Some(frame) = reader.next_frame()? {
            let keep = timeline::keep_frame(self.config.trim.as_ref(), seen, source.fps);
            seen += 1;

            if keep {
                let processed = stage.process(frame);
                store.write_frame(&processed)?;
                written += 1;
            }

            // Frame phase owns 0 to 80; the final encode pass is indeterminate
            self.tracker.percent(((seen * 80) / total).min(80) as u8);
        }

        reader.finish();
        store.finish()?;
        debug!("intermediate complete: {} of {} frames written", written, seen);

        self.tracker.indeterminate();
        let args = encoder::final_encode_args(store.path(), input, output, &self.config, source);
        encoder::run_ffmpeg(args).await?;
        drop(store);

        self.tracker.percent(100);
        self.summarize(output, seen, written)
    }

    fn summarize(&self, output: &Path, seen: u64, written: u64) -> Result<RunSummary> {
        let metadata = std::fs::metadata(output)?;
        Ok(RunSummary {
            frames_seen: seen,
            frames_written: written,
            output_path: output.display().to_string(),
            file_size: metadata.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Zoom;
    use crate::error::PipelineError;
    use crate::progress::{NullSink, ProgressEvent};
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn invalid_config_fails_before_touching_files() {
        let mut config = ProcessingConfig::default();
        config.zoom = Some(Zoom::new(99.0));

        let engine = PipelineEngine::new(config, Arc::new(NullSink));
        let err = engine
            .run(PathBuf::from("in.mp4"), PathBuf::from("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[tokio::test]
    async fn missing_source_reports_a_failed_status() {
        let sink = Arc::new(RecordingSink {
            events: Mutex::new(Vec::new()),
        });
        let mut config = ProcessingConfig::default();
        config.zoom = Some(Zoom::new(2.0));

        let engine = PipelineEngine::new(config, sink.clone());
        let err = engine
            .run(
                PathBuf::from("/nonexistent/input.mp4"),
                PathBuf::from("/tmp/out.mp4"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnreadable { .. }));

        let events = sink.events.lock().unwrap();
        assert_eq!(
            events.first(),
            Some(&ProgressEvent::Status(RunStatus::Processing))
        );
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::Status(RunStatus::Failed(_)))
        ));
    }
}
