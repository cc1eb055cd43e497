use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use tempfile::TempPath;
use tokio::task;
use tracing::{debug, warn};

use crate::{
    config::{CompressionLevel, ProcessingConfig},
    error::{PipelineError, Result},
    video::{frame::Frame, probe::SourceInfo},
};

/// Tempfile-backed intermediate video written while frames are processed.
///
/// Holds processed frames at native fps and pre-resize dimensions in a fast
/// lossy codec; the final pass re-reads it for the real encode. The backing
/// path is deleted when the store drops, so success, failure, and panic exits
/// all clean up.
pub struct IntermediateStore {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    path: TempPath,
}

impl IntermediateStore {
    pub fn create(info: &SourceInfo) -> Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("framewise-")
            .suffix(".mp4")
            .tempfile()
            .map_err(|e| PipelineError::EncodeFailed {
                reason: format!("failed to create intermediate file: {e}"),
            })?
            .into_temp_path();

        debug!("intermediate store at {}", path.display());

        let size = format!("{}x{}", info.width, info.height);
        let mut child = Command::new("ffmpeg")
            .args(["-y", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s", &size])
            .args(["-r", &info.fps_raw, "-i", "pipe:0"])
            .args(["-c:v", "mpeg4", "-q:v", "2", "-v", "error"])
            .arg(path.as_os_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PipelineError::EncodeFailed {
                reason: format!("failed to start ffmpeg: {e}"),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| PipelineError::EncodeFailed {
            reason: "ffmpeg stdin unavailable".to_string(),
        })?;

        Ok(Self {
            child,
            stdin: Some(BufWriter::new(stdin)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| PipelineError::EncodeFailed {
            reason: "intermediate store already closed".to_string(),
        })?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| PipelineError::EncodeFailed {
                reason: format!("intermediate write failed: {e}"),
            })
    }

    /// Close the input stream and wait for the writer to finish encoding
    pub fn finish(&mut self) -> Result<()> {
        // Dropping stdin closes the pipe so the child can exit
        self.stdin = None;

        let status = self
            .child
            .wait()
            .map_err(|e| PipelineError::EncodeFailed {
                reason: format!("intermediate encoder did not exit: {e}"),
            })?;

        if !status.success() {
            return Err(PipelineError::EncodeFailed {
                reason: "intermediate encoder exited with an error".to_string(),
            });
        }
        Ok(())
    }
}

impl Drop for IntermediateStore {
    fn drop(&mut self) {
        self.stdin = None;
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                warn!("failed to stop intermediate encoder: {}", e);
            }
            let _ = self.child.wait();
        }
        // TempPath removes the backing file when it drops
    }
}

/// Final-pass ffmpeg arguments: processed intermediate as video, original
/// source as (optionally trimmed) audio, resize via a scale filter, then the
/// H.264/AAC encode with the profile's CRF and bitrate cap.
pub fn final_encode_args(
    intermediate: &Path,
    source: &Path,
    output: &Path,
    config: &ProcessingConfig,
    info: &SourceInfo,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-i".into(),
        intermediate.display().to_string(),
    ];

    if let Some(trim) = &config.trim {
        args.extend(["-ss".into(), trim.start.to_string()]);
        args.extend(["-to".into(), trim.end.to_string()]);
    }
    args.extend(["-i".into(), source.display().to_string()]);

    // Video from the intermediate, audio from the source when it has any
    args.extend(["-map".into(), "0:v:0".into()]);
    args.extend(["-map".into(), "1:a:0?".into()]);

    if let Some(resize) = &config.resize {
        let w = (info.width as f64 * resize.factor) as u32;
        let h = (info.height as f64 * resize.factor) as u32;
        args.extend(["-vf".into(), format!("scale={w}:{h}")]);
    }

    args.extend(encode_profile_args(config.compression));
    args.extend(["-v".into(), "error".into()]);
    args.push(output.display().to_string());
    args
}

/// Direct re-encode arguments for runs with no per-frame operations
pub fn direct_reencode_args(
    source: &Path,
    output: &Path,
    compression: CompressionLevel,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), source.display().to_string()];
    args.extend(encode_profile_args(compression));
    args.extend(["-v".into(), "error".into()]);
    args.push(output.display().to_string());
    args
}

fn encode_profile_args(compression: CompressionLevel) -> Vec<String> {
    let maxrate = format!("{}k", compression.maxrate_kbps());
    vec![
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "veryfast".into(),
        "-crf".into(),
        compression.crf().to_string(),
        "-maxrate".into(),
        maxrate.clone(),
        "-bufsize".into(),
        maxrate,
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        "aac".into(),
    ]
}

/// Run a one-shot ffmpeg command to completion off the async runtime
pub async fn run_ffmpeg(args: Vec<String>) -> Result<()> {
    let output = task::spawn_blocking(move || Command::new("ffmpeg").args(&args).output())
        .await
        .map_err(|e| PipelineError::EncodeFailed {
            reason: format!("encode task failed: {e}"),
        })?
        .map_err(|e| PipelineError::EncodeFailed {
            reason: format!("failed to start ffmpeg: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::EncodeFailed {
            reason: format!("ffmpeg failed: {}", stderr.trim()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resize;
    use crate::timeline::TrimWindow;
    use std::path::PathBuf;

    fn info() -> SourceInfo {
        SourceInfo {
            width: 1280,
            height: 720,
            fps: 30.0,
            fps_raw: "30/1".to_string(),
            total_frames: 300,
            duration: 10.0,
        }
    }

    fn contains_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn profile_args_carry_crf_and_bitrate_cap() {
        let args = direct_reencode_args(
            &PathBuf::from("in.mp4"),
            &PathBuf::from("out.mp4"),
            CompressionLevel::High,
        );
        assert!(contains_pair(&args, "-c:v", "libx264"));
        assert!(contains_pair(&args, "-preset", "veryfast"));
        assert!(contains_pair(&args, "-crf", "22"));
        assert!(contains_pair(&args, "-maxrate", "4000k"));
        assert!(contains_pair(&args, "-bufsize", "4000k"));
        assert!(contains_pair(&args, "-c:a", "aac"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn final_args_without_ops_have_no_trim_or_scale() {
        let config = ProcessingConfig::default();
        let args = final_encode_args(
            &PathBuf::from("/tmp/mid.mp4"),
            &PathBuf::from("in.mp4"),
            &PathBuf::from("out.mp4"),
            &config,
            &info(),
        );
        assert!(!args.iter().any(|a| a == "-ss"));
        assert!(!args.iter().any(|a| a == "-vf"));
        assert!(contains_pair(&args, "-map", "0:v:0"));
        assert!(contains_pair(&args, "-map", "1:a:0?"));
        assert!(contains_pair(&args, "-crf", "26"));
    }

    #[test]
    fn trim_window_applies_to_the_audio_input() {
        let mut config = ProcessingConfig::default();
        config.trim = Some(TrimWindow::new(2.0, 5.0));
        let args = final_encode_args(
            &PathBuf::from("/tmp/mid.mp4"),
            &PathBuf::from("in.mp4"),
            &PathBuf::from("out.mp4"),
            &config,
            &info(),
        );

        assert!(contains_pair(&args, "-ss", "2"));
        assert!(contains_pair(&args, "-to", "5"));

        // Input-side seek: the trim flags precede the source input
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let src = args.iter().position(|a| a == "in.mp4").unwrap();
        assert!(ss < src);
    }

    #[test]
    fn resize_emits_a_truncated_scale_filter() {
        let mut config = ProcessingConfig::default();
        config.resize = Some(Resize::new(0.5));
        let args = final_encode_args(
            &PathBuf::from("/tmp/mid.mp4"),
            &PathBuf::from("in.mp4"),
            &PathBuf::from("out.mp4"),
            &config,
            &info(),
        );
        assert!(contains_pair(&args, "-vf", "scale=640:360"));
    }

    #[test]
    fn odd_resize_factors_truncate_dimensions() {
        let mut config = ProcessingConfig::default();
        config.resize = Some(Resize::new(0.3));
        let args = final_encode_args(
            &PathBuf::from("/tmp/mid.mp4"),
            &PathBuf::from("in.mp4"),
            &PathBuf::from("out.mp4"),
            &config,
            &info(),
        );
        // 1280 * 0.3 = 384, 720 * 0.3 = 216
        assert!(contains_pair(&args, "-vf", "scale=384:216"));
    }
}
