//! Configuration types for task execution

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Interval at which waits check for cancellation
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Shell used to run commands when none is configured
pub fn default_shell() -> Vec<String> {
    if cfg!(target_family = "unix") {
        vec!["sh".to_string(), "-c".to_string()]
    } else {
        vec!["cmd".to_string(), "/C".to_string()]
    }
}

/// Configuration for task execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    /// Maximum number of task processes running at once
    pub max_parallel: usize,
    /// Keep running independent tasks after a failure
    pub continue_on_error: bool,
    /// Simulate every task instead of spawning processes
    pub dry_run: bool,
    /// Timeout for tasks that do not declare one
    pub default_timeout: Option<Duration>,
    /// Program and leading arguments; the command string is appended
    pub shell: Vec<String>,
    /// Directory that relative task working directories resolve against
    pub base_dir: Option<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_parallel: 1,
            continue_on_error: false,
            dry_run: false,
            default_timeout: None,
            shell: default_shell(),
            base_dir: None,
        }
    }
}

impl ExecutorConfig {
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn with_shell<I, S>(mut self, shell: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shell = shell.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

/// Shared cancellation signal.
///
/// Once set it stays set: no new tasks start, running processes are killed
/// and retry delays end early.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless cancelled first. Returns false if the
    /// sleep was cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.is_cancelled() {
                return false;
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => POLL_INTERVAL,
            };
            if remaining.is_zero() {
                return true;
            }
            thread::sleep(remaining.min(POLL_INTERVAL));
        }
    }
}
