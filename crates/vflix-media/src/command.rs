//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// How many trailing stderr lines are kept for error reports.
const STDERR_TAIL_LINES: usize = 12;

/// Builder for FFmpeg invocations.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set frame size (`-s WxH`).
    pub fn size(self, dimensions: impl Into<String>) -> Self {
        self.output_arg("-s").output_arg(dimensions)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Stream-copy all streams (`-codec copy`).
    pub fn codec_copy(self) -> Self {
        self.output_arg("-codec").output_arg("copy")
    }

    /// Force an output container format.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Input args
        args.extend(self.input_args.clone());

        // Input file
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Failure modes of one FFmpeg invocation.
///
/// The pipeline stages map `Exited` onto their own [`MediaError`] variant so
/// an encode failure stays distinguishable from a packaging failure.
#[derive(Debug)]
pub enum RunError {
    /// The process could not be spawned.
    Spawn(std::io::Error),
    /// The process ran and exited non-zero.
    Exited {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },
    /// The deadline elapsed; the process was killed.
    Timeout(u64),
    /// The cancellation signal fired; the process was killed.
    Cancelled,
}

/// Runner for FFmpeg commands with deadline and cancellation support.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout per invocation
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    /// Create a new runner with no deadline and no cancellation signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set a deadline per invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> Result<(), RunError> {
        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(RunError::Spawn)?;

        let stderr = child.stderr.take();
        let capture = tokio::spawn(capture_stderr_tail(stderr));

        let status = self.wait_for_completion(&mut child).await;
        let stderr_tail = capture.await.ok().flatten();

        let status = status?;
        if status.success() {
            Ok(())
        } else {
            Err(RunError::Exited {
                exit_code: status.code(),
                stderr: stderr_tail,
            })
        }
    }

    /// Wait for the child, racing the deadline and the cancellation signal.
    /// Either losing race kills the process before returning.
    async fn wait_for_completion(
        &self,
        child: &mut Child,
    ) -> Result<std::process::ExitStatus, RunError> {
        let mut cancel_rx = self.cancel_rx.clone();

        // The select only picks the outcome; the wait future (and its borrow
        // of the child) is gone before any kill below.
        let outcome = tokio::select! {
            status = child.wait() => WaitOutcome::Exited(status),
            _ = sleep_until_deadline(self.timeout) => WaitOutcome::TimedOut,
            _ = wait_cancelled(&mut cancel_rx) => WaitOutcome::Cancelled,
        };

        match outcome {
            WaitOutcome::Exited(status) => status.map_err(RunError::Spawn),
            WaitOutcome::TimedOut => {
                let secs = self.timeout.map(|t| t.as_secs()).unwrap_or(0);
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
                Err(RunError::Timeout(secs))
            }
            WaitOutcome::Cancelled => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
                Err(RunError::Cancelled)
            }
        }
    }
}

enum WaitOutcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Sleep until the deadline, or forever when none is set.
async fn sleep_until_deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending().await,
    }
}

/// Resolve once the cancellation signal turns true; never without one.
async fn wait_cancelled(cancel_rx: &mut Option<watch::Receiver<bool>>) {
    match cancel_rx {
        Some(rx) => loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender dropped without cancelling.
                std::future::pending::<()>().await;
            }
        },
        None => std::future::pending().await,
    }
}

/// Collect the last lines of stderr for error reports.
async fn capture_stderr_tail(stderr: Option<ChildStderr>) -> Option<String> {
    let stderr = stderr?;
    let mut lines = BufReader::new(stderr).lines();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    if tail.is_empty() {
        None
    } else {
        Some(tail.into_iter().collect::<Vec<_>>().join("\n"))
    }
}

/// Check that FFmpeg is available on PATH.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}
