// ── Camera access ──
//
// A live scan owns the camera for as long as its `LiveFeed` exists.
// Dropping or stopping the feed releases the device, so there is no path
// that leaves the camera running after the session moves on.

use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Buffer between the decoder and the controller. Decodes beyond the first
/// are discarded by the state machine anyway.
const DECODE_CHANNEL_SIZE: usize = 8;

/// Decoder stderr lines kept for the failure message.
const STDERR_TAIL_LINES: usize = 3;

/// How long to wait for the decoder's stderr to drain after it exits.
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Why the camera could not be used.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),
}

// ── LiveFeed ─────────────────────────────────────────────────────────

/// Releases whatever is producing frames.
pub trait CameraHandle: Send {
    fn stop(&mut self);
}

impl CameraHandle for CancellationToken {
    fn stop(&mut self) {
        self.cancel();
    }
}

/// Decoded payloads from an open camera.
pub struct LiveFeed {
    codes: mpsc::Receiver<String>,
    handle: Box<dyn CameraHandle>,
    exit: Option<oneshot::Receiver<String>>,
    stopped: bool,
}

impl LiveFeed {
    pub fn new(codes: mpsc::Receiver<String>, handle: impl CameraHandle + 'static) -> Self {
        Self {
            codes,
            handle: Box::new(handle),
            exit: None,
            stopped: false,
        }
    }

    /// Attach a channel on which the source reports why it ended.
    pub fn with_exit_reason(mut self, exit: oneshot::Receiver<String>) -> Self {
        self.exit = Some(exit);
        self
    }

    /// Why the camera ended on its own, once `next_payload` has returned
    /// `None`. `None` when it was stopped or gave no reason. Cancel-safe.
    pub async fn exit_reason(&mut self) -> Option<String> {
        if self.stopped {
            return None;
        }
        let exit = self.exit.as_mut()?;
        let reason = exit.await.ok();
        self.exit = None;
        reason
    }

    /// Wait for the next decoded payload. `None` once the camera has
    /// stopped producing. Cancel-safe.
    pub async fn next_payload(&mut self) -> Option<String> {
        if self.stopped {
            return None;
        }
        self.codes.recv().await
    }

    /// Release the camera. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.codes.close();
        self.handle.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for LiveFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveFeed")
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

/// Anything that can be opened into a [`LiveFeed`].
pub trait Camera {
    fn open(&self) -> impl Future<Output = Result<LiveFeed, DeviceError>> + Send;
}

// ── ProcessCamera ────────────────────────────────────────────────────

/// Camera backed by an external barcode decoder that prints one payload
/// per line on stdout, e.g. `zbarcam --raw --nodisplay`.
#[derive(Debug, Clone)]
pub struct ProcessCamera {
    program: String,
    args: Vec<String>,
}

impl ProcessCamera {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args..]` command line.
    pub fn from_command_line(command: &[String]) -> Result<Self, DeviceError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| DeviceError::Unavailable("no scanner command configured".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Camera for ProcessCamera {
    async fn open(&self) -> Result<LiveFeed, DeviceError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.program, &e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DeviceError::Failed("decoder output not captured".into()))?;
        let stderr = child.stderr.take().map(|err| tokio::spawn(stderr_tail(err)));

        let (tx, rx) = mpsc::channel(DECODE_CHANNEL_SIZE);
        let (exit_tx, exit_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let reader_cancel = cancel.clone();
        let program = self.program.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    () = reader_cancel.cancelled() => {
                        kill(&mut child);
                        return;
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            if tx.send(line).await.is_err() {
                                kill(&mut child);
                                return;
                            }
                        }
                        Ok(None) => {
                            debug!(%program, "decoder closed its output");
                            break;
                        }
                        Err(e) => {
                            warn!(%program, error = %e, "decoder output unreadable");
                            break;
                        }
                    }
                }
            }

            let status = tokio::select! {
                () = reader_cancel.cancelled() => {
                    kill(&mut child);
                    return;
                }
                status = child.wait() => status.ok(),
            };
            let tail = match stderr {
                Some(task) => tokio::time::timeout(STDERR_DRAIN_TIMEOUT, task)
                    .await
                    .ok()
                    .and_then(Result::ok)
                    .unwrap_or_default(),
                None => Vec::new(),
            };

            let reason = exit_message(&program, status, &tail);
            warn!(%program, %reason, "decoder ended");
            // Close the payload channel before reporting.
            drop(tx);
            let _ = exit_tx.send(reason);
        });

        debug!(program = %self.program, "decoder started");
        Ok(LiveFeed::new(rx, cancel).with_exit_reason(exit_rx))
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "decoder already exited");
    }
}

/// Last few non-blank lines the decoder wrote to stderr.
async fn stderr_tail(stderr: impl AsyncRead + Unpin) -> Vec<String> {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_owned());
    }
    tail.into()
}

fn exit_message(program: &str, status: Option<ExitStatus>, stderr: &[String]) -> String {
    let mut message = match status {
        Some(status) if status.success() => format!("scanner `{program}` exited"),
        Some(status) => format!("scanner `{program}` failed ({status})"),
        None => format!("scanner `{program}` stopped delivering frames"),
    };
    if !stderr.is_empty() {
        message.push_str(": ");
        message.push_str(&stderr.join("; "));
    }
    message
}

fn spawn_error(program: &str, err: &io::Error) -> DeviceError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            DeviceError::Unavailable(format!("scanner program `{program}` not found"))
        }
        io::ErrorKind::PermissionDenied => {
            DeviceError::PermissionDenied(format!("cannot run `{program}`: {err}"))
        }
        _ => DeviceError::Failed(format!("failed to start `{program}`: {err}")),
    }
}
