use serde::{Deserialize, Serialize};

/// Temporal trim window in seconds, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    /// Start of the kept range, seconds from the beginning of the source
    pub start: f64,

    /// End of the kept range, seconds from the beginning of the source
    pub end: f64,
}

impl TrimWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the kept range in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether a point in time falls inside the window
    pub fn contains(&self, seconds: f64) -> bool {
        self.start <= seconds && seconds <= self.end
    }

    /// Whether the frame at `index` (0-based) survives the trim.
    ///
    /// The frame's time offset is `index / fps`.
    pub fn contains_frame(&self, index: u64, fps: f64) -> bool {
        self.contains(index as f64 / fps)
    }
}

/// Keep/drop decision for one frame. No trim window means every frame is kept.
///
/// Dropped frames still advance the progress counter; they are simply never
/// written to the intermediate store.
pub fn keep_frame(trim: Option<&TrimWindow>, index: u64, fps: f64) -> bool {
    match trim {
        Some(window) => window.contains_frame(index, fps),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_trim_keeps_everything() {
        assert!(keep_frame(None, 0, 30.0));
        assert!(keep_frame(None, 1_000_000, 30.0));
    }

    #[test]
    fn trim_boundaries_are_inclusive() {
        // 2.0s..5.0s at 10 fps
        let window = TrimWindow::new(2.0, 5.0);

        assert!(!window.contains_frame(19, 10.0)); // t = 1.9
        assert!(window.contains_frame(20, 10.0)); // t = 2.0
        assert!(window.contains_frame(50, 10.0)); // t = 5.0
        assert!(!window.contains_frame(51, 10.0)); // t = 5.1
    }

    #[test]
    fn duration_is_end_minus_start() {
        let window = TrimWindow::new(2.0, 5.0);
        assert_eq!(window.duration(), 3.0);
    }

    #[test]
    fn window_starting_at_zero_keeps_first_frame() {
        let window = TrimWindow::new(0.0, 1.0);
        assert!(window.contains_frame(0, 30.0));
    }
}
