//! Camera adapter backed by an `ffmpeg` child process emitting MJPEG.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::mjpeg::MjpegSplitter;
use crate::domain::errors::CameraError;
use crate::domain::ports::{CameraPort, CameraStream, FacingMode};
use crate::infrastructure::config::CameraConfig;

/// How long a freshly opened device may take to deliver its first frame.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
const READ_CHUNK: usize = 64 * 1024;
const MAX_STDERR_BYTES: u64 = 4096;

/// Opens cameras through `ffmpeg`.
pub struct FfmpegCamera {
    config: CameraConfig,
}

impl FfmpegCamera {
    /// Creates camera adapter.
    #[must_use]
    pub const fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    /// Returns the `ffmpeg` arguments for `facing`.
    #[must_use]
    pub fn args(&self, facing: FacingMode) -> Vec<String> {
        [
            "-loglevel",
            "error",
            "-f",
            self.config.input_format.as_str(),
            "-i",
            self.config.device_for(facing),
            "-f",
            "image2pipe",
            "-vcodec",
            "mjpeg",
            "-",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }
}

#[async_trait]
impl CameraPort for FfmpegCamera {
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>, CameraError> {
        let stream = spawn_stream(&self.config.ffmpeg_path, &self.args(facing), facing).await?;
        Ok(Box::new(stream))
    }
}

/// Spawns `program` and waits for its first MJPEG frame on stdout.
async fn spawn_stream(
    program: &str,
    args: &[String],
    facing: FacingMode,
) -> Result<FfmpegStream, CameraError> {
    debug!(program, ?args, %facing, "Opening camera");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CameraError::access_denied(format!("cannot start {program}: {e}")))?;

    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            let _ = child.start_kill();
            return Err(CameraError::access_denied("camera process has no output pipe"));
        }
    };

    let latest = Arc::new(Mutex::new(None));
    let ended = Arc::new(AtomicBool::new(false));
    let (first_tx, first_rx) = oneshot::channel();
    let reader = tokio::spawn(read_frames(stdout, latest.clone(), ended.clone(), first_tx));

    match tokio::time::timeout(FIRST_FRAME_TIMEOUT, first_rx).await {
        Ok(Ok(())) => {
            info!(%facing, "Camera stream started");
            Ok(FfmpegStream {
                facing,
                child: Some(child),
                latest,
                ended,
                reader,
            })
        }
        Ok(Err(_)) => {
            let detail = drain_stderr(stderr).await;
            let _ = child.start_kill();
            reader.abort();
            warn!(%facing, detail = %detail, "Camera ended before the first frame");
            Err(CameraError::access_denied(detail))
        }
        Err(_) => {
            let _ = child.start_kill();
            reader.abort();
            warn!(%facing, "Camera produced no frame in time");
            Err(CameraError::access_denied("camera produced no frame"))
        }
    }
}

async fn read_frames(
    mut stdout: ChildStdout,
    latest: Arc<Mutex<Option<Bytes>>>,
    ended: Arc<AtomicBool>,
    first_tx: oneshot::Sender<()>,
) {
    let mut first_tx = Some(first_tx);
    let mut splitter = MjpegSplitter::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if let Some(frame) = splitter.push(&chunk[..n]) {
                    if let Ok(mut slot) = latest.lock() {
                        *slot = Some(frame);
                    }
                    if let Some(tx) = first_tx.take() {
                        let _ = tx.send(());
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Camera read failed");
                break;
            }
        }
    }

    ended.store(true, Ordering::SeqCst);
    debug!("Camera stream reader finished");
}

async fn drain_stderr(stderr: ChildStderr) -> String {
    let mut text = String::new();
    let _ = stderr.take(MAX_STDERR_BYTES).read_to_string(&mut text).await;
    let text = text.trim();
    if text.is_empty() {
        "camera process exited".to_string()
    } else {
        text.to_string()
    }
}

/// A running `ffmpeg` capture.
pub struct FfmpegStream {
    facing: FacingMode,
    child: Option<Child>,
    latest: Arc<Mutex<Option<Bytes>>>,
    ended: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl CameraStream for FfmpegStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn latest_frame(&self) -> Option<Bytes> {
        if self.child.is_none() {
            return None;
        }
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }

    fn is_live(&mut self) -> bool {
        if self.ended.load(Ordering::SeqCst) {
            return false;
        }
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                debug!(%status, "Camera process exited");
                false
            }
            Some(Err(_)) | None => false,
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
            self.reader.abort();
            info!(facing = %self.facing, "Camera stream stopped");
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}
