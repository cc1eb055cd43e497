use crate::{
    config::{FilterKind, ProcessingConfig},
    transform::{filter, tone, zoom},
    video::frame::Frame,
};

/// Per-frame transform chain, built once per run.
///
/// Stage order is fixed: zoom, then filter, then tone. A stage whose config
/// is absent is skipped without copying the frame.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    zoom: Option<f64>,
    filter: Option<FilterKind>,
    tone: Option<(i32, f32)>,
}

impl FramePipeline {
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self {
            zoom: config.zoom.map(|z| z.factor),
            filter: config.filter,
            tone: config.tone.map(|t| (t.brightness, t.contrast)),
        }
    }

    /// Whether any stage will touch pixels
    pub fn is_empty(&self) -> bool {
        self.zoom.is_none() && self.filter.is_none() && self.tone.is_none()
    }

    pub fn process(&self, frame: Frame) -> Frame {
        let frame = match self.zoom {
            Some(factor) => zoom::zoom(&frame, factor),
            None => frame,
        };
        let frame = match &self.filter {
            Some(kind) => filter::apply(&frame, kind),
            None => frame,
        };
        match self.tone {
            Some((brightness, contrast)) => tone::adjust(&frame, brightness, contrast),
            None => frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ToneAdjust, Zoom};
    use image::Rgb;

    #[test]
    fn empty_pipeline_is_identity() {
        let pipeline = FramePipeline::from_config(&ProcessingConfig::default());
        assert!(pipeline.is_empty());

        let mut frame = Frame::black(8, 8);
        frame.put_pixel(3, 3, Rgb([1, 2, 3]));
        let out = pipeline.process(frame);
        assert_eq!(out.get_pixel(3, 3), Rgb([1, 2, 3]));
    }

    #[test]
    fn stages_preserve_dimensions() {
        let mut config = ProcessingConfig::default();
        config.zoom = Some(Zoom::new(1.5));
        config.filter = Some(FilterKind::Gray);
        config.tone = Some(ToneAdjust::new(20, 1.2));

        let pipeline = FramePipeline::from_config(&config);
        assert!(!pipeline.is_empty());

        let out = pipeline.process(Frame::black(64, 48));
        assert_eq!(out.width(), 64);
        assert_eq!(out.height(), 48);
    }

    #[test]
    fn tone_runs_after_filter() {
        // Gray then brightness lift: a pure-red pixel becomes its luma plus
        // the brightness offset on every channel.
        let mut config = ProcessingConfig::default();
        config.filter = Some(FilterKind::Gray);
        config.tone = Some(ToneAdjust::new(10, 1.0));

        let pipeline = FramePipeline::from_config(&config);
        let mut frame = Frame::black(4, 4);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        let out = pipeline.process(frame);

        // luma(255, 0, 0) = 76, + 10 = 86
        assert_eq!(out.get_pixel(0, 0), Rgb([86, 86, 86]));
    }
}
