use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::{
    error::{PipelineError, Result},
    video::{frame::Frame, probe::SourceInfo},
};

/// Sequential frame cursor over a source file.
///
/// Decodes through an ffmpeg child process writing raw rgb24 frames to a
/// pipe. Frames arrive strictly in presentation order; there is no seeking.
pub struct FrameReader {
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    frame_len: usize,
}

impl FrameReader {
    pub fn open<P: AsRef<Path>>(path: P, info: &SourceInfo) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening frame reader for {}", path.display());

        let mut child = Command::new("ffmpeg")
            .arg("-i")
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-v", "error", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PipelineError::DecodeFailed {
                reason: format!("failed to start ffmpeg: {e}"),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| PipelineError::DecodeFailed {
            reason: "ffmpeg stdout unavailable".to_string(),
        })?;

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            width: info.width,
            height: info.height,
            frame_len: info.frame_bytes(),
        })
    }

    /// Read the next frame. `Ok(None)` signals a clean end of stream.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut buf = vec![0u8; self.frame_len];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {
                let frame = Frame::from_raw(self.width, self.height, buf).ok_or_else(|| {
                    PipelineError::DecodeFailed {
                        reason: "frame buffer size mismatch".to_string(),
                    }
                })?;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(PipelineError::DecodeFailed {
                reason: format!("raw frame read failed: {e}"),
            }),
        }
    }

    /// Release the decoder. Cleanup failures are logged, never surfaced.
    pub fn finish(mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                warn!("failed to stop decoder process: {}", e);
            }
        }
        if let Err(e) = self.child.wait() {
            warn!("failed to reap decoder process: {}", e);
        }
    }
}

impl Drop for FrameReader {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
