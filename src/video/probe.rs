use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{PipelineError, Result};

/// Source stream metadata gathered before any decoding starts
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Frame rate as a float, for trim math and frame-count estimation
    pub fps: f64,
    /// Frame rate as ffprobe reported it (rational form), passed through
    /// verbatim so the intermediate store runs at the exact native rate
    pub fps_raw: String,
    pub total_frames: u64,
    pub duration: f64,
}

impl SourceInfo {
    /// Byte length of one raw rgb24 frame
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Probe a source file with ffprobe.
///
/// A missing file or a failed probe both mean the source is unusable, and
/// both surface as `SourceUnreadable` before any output file exists.
pub fn probe<P: AsRef<Path>>(path: P) -> Result<SourceInfo> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::SourceUnreadable {
            path: path.display().to_string(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .map_err(|_| PipelineError::SourceUnreadable {
            path: path.display().to_string(),
        })?;

    if !output.status.success() {
        return Err(PipelineError::SourceUnreadable {
            path: path.display().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!("ffprobe output: {}", stdout.trim());

    parse_probe_output(&stdout).ok_or_else(|| PipelineError::SourceUnreadable {
        path: path.display().to_string(),
    })
}

/// Parse ffprobe csv output: one stream line
/// (`width,height,r_frame_rate,nb_frames`) followed by one format line
/// (`duration`). `nb_frames` is absent or `N/A` in containers that do not
/// index frames, in which case the count is estimated from duration and fps.
fn parse_probe_output(raw: &str) -> Option<SourceInfo> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());

    let stream_line = lines.next()?;
    let mut fields = stream_line.split(',');

    let width: u32 = fields.next()?.trim().parse().ok()?;
    let height: u32 = fields.next()?.trim().parse().ok()?;
    let fps_raw = fields.next()?.trim().to_string();
    let fps = parse_rational(&fps_raw)?;
    if fps <= 0.0 || width == 0 || height == 0 {
        return None;
    }

    let nb_frames: u64 = fields
        .next()
        .and_then(|f| f.trim().parse().ok())
        .unwrap_or(0);

    let duration: f64 = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .unwrap_or(0.0);

    let total_frames = if nb_frames > 0 {
        nb_frames
    } else {
        (duration * fps).round() as u64
    };

    Some(SourceInfo {
        width,
        height,
        fps,
        fps_raw,
        total_frames,
        duration,
    })
}

/// Parse a frame rate in `num/den` or plain decimal form
fn parse_rational(raw: &str) -> Option<f64> {
    match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => raw.trim().parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_probe() {
        let info = parse_probe_output("1920,1080,30000/1001,300\n10.010000\n").unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.fps - 29.97).abs() < 0.01);
        assert_eq!(info.fps_raw, "30000/1001");
        assert_eq!(info.total_frames, 300);
        assert!((info.duration - 10.01).abs() < 1e-9);
        assert_eq!(info.frame_bytes(), 1920 * 1080 * 3);
    }

    #[test]
    fn missing_frame_count_is_estimated_from_duration() {
        let info = parse_probe_output("640,480,25/1,N/A\n4.0\n").unwrap();
        assert_eq!(info.total_frames, 100);

        let info = parse_probe_output("640,480,25/1,0\n4.0\n").unwrap();
        assert_eq!(info.total_frames, 100);
    }

    #[test]
    fn plain_decimal_frame_rate_is_accepted() {
        let info = parse_probe_output("320,240,30,90\n3.0\n").unwrap();
        assert_eq!(info.fps, 30.0);
        assert_eq!(info.total_frames, 90);
    }

    #[test]
    fn garbage_output_is_rejected() {
        assert!(parse_probe_output("").is_none());
        assert!(parse_probe_output("not,numbers,at,all\nx\n").is_none());
        assert!(parse_probe_output("640,480,0/0,10\n1.0\n").is_none());
        assert!(parse_probe_output("0,480,25/1,10\n1.0\n").is_none());
    }

    #[test]
    fn probing_a_missing_file_fails_cleanly() {
        let err = probe("/nonexistent/definitely_not_here.mp4").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnreadable { .. }));
    }
}
