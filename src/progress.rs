use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Lifecycle state of a processing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Ready,
    Processing,
    Succeeded,
    Failed(String),
}

/// One progress notification. Percent values cover the frame-processing phase
/// (0 to 80) and completion (100); the final encode pass has no measurable
/// sub-progress and reports `Indeterminate` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Percent(u8),
    Indeterminate,
    Status(RunStatus),
}

/// Receives progress notifications. Implementations must not block; the
/// engine calls `report` from its processing loop.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _event: ProgressEvent) {}
}

/// Wraps a sink and enforces monotonic percent delivery.
///
/// Out-of-order or repeated percent values are swallowed, so the sink only
/// ever observes a non-decreasing sequence.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    last_percent: AtomicU8,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            last_percent: AtomicU8::new(0),
        }
    }

    /// Report a percent value; values at or below the running maximum are
    /// dropped. Capped at 100.
    pub fn percent(&self, value: u8) {
        let value = value.min(100);
        let prev = self.last_percent.fetch_max(value, Ordering::Relaxed);
        if value > prev {
            self.sink.report(ProgressEvent::Percent(value));
        }
    }

    pub fn indeterminate(&self) {
        self.sink.report(ProgressEvent::Indeterminate);
    }

    pub fn status(&self, status: RunStatus) {
        self.sink.report(ProgressEvent::Status(status));
    }
}

/// Terminal progress bar sink
pub struct ConsoleSink {
    bar: ProgressBar,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleSink {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Percent(value) => {
                self.bar.disable_steady_tick();
                self.bar.set_position(value as u64);
            }
            ProgressEvent::Indeterminate => {
                self.bar.set_message("encoding");
                self.bar.enable_steady_tick(Duration::from_millis(120));
            }
            ProgressEvent::Status(status) => match status {
                RunStatus::Ready => {}
                RunStatus::Processing => self.bar.set_message("processing"),
                RunStatus::Succeeded => {
                    self.bar.set_position(100);
                    self.bar.finish_with_message("done");
                }
                RunStatus::Failed(message) => {
                    self.bar.abandon_with_message(format!("failed: {message}"));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn percents(&self) -> Vec<u8> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    ProgressEvent::Percent(v) => Some(*v),
                    _ => None,
                })
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn percent_delivery_is_monotonic() {
        let sink = Arc::new(RecordingSink::new());
        let tracker = ProgressTracker::new(sink.clone());

        tracker.percent(10);
        tracker.percent(5);
        tracker.percent(10);
        tracker.percent(40);
        tracker.percent(40);
        tracker.percent(80);

        assert_eq!(sink.percents(), vec![10, 40, 80]);
    }

    #[test]
    fn percent_is_capped_at_100() {
        let sink = Arc::new(RecordingSink::new());
        let tracker = ProgressTracker::new(sink.clone());

        tracker.percent(250);
        assert_eq!(sink.percents(), vec![100]);
    }

    #[test]
    fn status_and_indeterminate_pass_through() {
        let sink = Arc::new(RecordingSink::new());
        let tracker = ProgressTracker::new(sink.clone());

        tracker.status(RunStatus::Processing);
        tracker.indeterminate();
        tracker.status(RunStatus::Succeeded);

        let events = sink.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ProgressEvent::Status(RunStatus::Processing),
                ProgressEvent::Indeterminate,
                ProgressEvent::Status(RunStatus::Succeeded),
            ]
        );
    }
}
