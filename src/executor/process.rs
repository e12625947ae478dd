//! Low-level command execution with timeout, cancellation and bounded output

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use super::config::{CancelFlag, POLL_INTERVAL};

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured output per stream (10MB)
const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Engine-side failure to run a command at all
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("no shell configured to run commands")]
    NoShell,

    #[error("failed to spawn command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for command `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to spawn one task process
#[derive(Debug, Clone)]
pub struct ProcessSpec<'a> {
    pub command: &'a str,
    pub shell: &'a [String],
    pub working_dir: Option<&'a Path>,
    pub env: &'a BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

/// Captured result of one process run
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    /// Killed because the timeout elapsed
    pub timed_out: bool,
    /// Killed because the run was cancelled
    pub cancelled: bool,
}

impl ProcessOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out && !self.cancelled
    }
}

/// Run a shell command and wait for it, killing its process group on timeout
/// or cancellation.
///
/// Output is drained on reader threads while waiting, so a chatty child can
/// never block on a full pipe.
#[instrument(
    skip_all,
    fields(
        command = spec.command,
        timeout_ms = spec.timeout.map(|t| t.as_millis() as u64)
    )
)]
pub fn run_process(
    spec: &ProcessSpec<'_>,
    cancel: &CancelFlag,
) -> Result<ProcessOutcome, ProcessError> {
    let start = Instant::now();
    let mut child = spawn_shell_command(spec)?;

    let stdout_rx = drain(child.stdout.take());
    let stderr_rx = drain(child.stderr.take());

    let deadline = spec.timeout.and_then(|t| start.checked_add(t));
    let mut timed_out = false;
    let mut cancelled = false;

    let status = loop {
        let slice = match deadline {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        };

        match child.wait_timeout(slice) {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(source) => {
                kill_process_tree(&mut child);
                return Err(ProcessError::Wait {
                    command: spec.command.to_string(),
                    source,
                });
            }
        }

        if cancel.is_cancelled() {
            warn!("run cancelled, killing command");
            cancelled = true;
            kill_process_tree(&mut child);
            break None;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("command timed out, killing");
            timed_out = true;
            kill_process_tree(&mut child);
            break None;
        }
    };

    let duration = start.elapsed();

    // Reader threads finish once every holder of the pipes is gone
    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let mut stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());

    if timed_out {
        let secs = spec.timeout.map(|t| t.as_secs_f64()).unwrap_or_default();
        stderr.push_str(&format!("\n[process killed after {secs}s timeout]"));
    } else if cancelled {
        stderr.push_str("\n[process killed: run cancelled]");
    }

    let exit_code = status.and_then(|s| s.code());
    debug!(
        exit_code = ?exit_code,
        timed_out,
        cancelled,
        duration_ms = duration.as_millis() as u64,
        "command finished"
    );

    Ok(ProcessOutcome {
        exit_code,
        stdout,
        stderr,
        duration,
        timed_out,
        cancelled,
    })
}

/// Spawn a command through the configured shell.
///
/// The command string is passed as a single argument. On unix the child
/// leads its own process group so the whole tree can be killed together.
fn spawn_shell_command(spec: &ProcessSpec<'_>) -> Result<Child, ProcessError> {
    let (program, args) = spec.shell.split_first().ok_or(ProcessError::NoShell)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .arg(spec.command)
        .envs(spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = spec.working_dir {
        cmd.current_dir(dir);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd.spawn().map_err(|source| {
        error!(err = %source, "failed to spawn command");
        ProcessError::Spawn {
            command: spec.command.to_string(),
            source,
        }
    })
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// Read a stream to string, keeping at most MAX_OUTPUT_SIZE bytes.
///
/// Data past the limit is drained and discarded so the writer never sees a
/// broken pipe, and a truncation marker is appended.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    while stream.read(&mut chunk).unwrap_or(0) > 0 {}
                    buf.extend_from_slice(b"\n[output truncated at 10MB]");
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Kill the child and everything it spawned, then reap it
fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            // The group may already be gone
            let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Resolve a task working directory against an optional base directory
pub fn resolve_working_dir(base: Option<&Path>, dir: Option<&Path>) -> Option<PathBuf> {
    match (base, dir) {
        (_, Some(dir)) if dir.is_absolute() => Some(dir.to_path_buf()),
        (Some(base), Some(dir)) => Some(base.join(dir)),
        (None, Some(dir)) => Some(dir.to_path_buf()),
        (Some(base), None) => Some(base.to_path_buf()),
        (None, None) => None,
    }
}
