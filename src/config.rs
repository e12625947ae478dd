//! Engine configuration
//!
//! Settings come from an optional `weft.toml` and are then overridden by
//! command-line flags. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::engine::GateSource;
use crate::error::ConfigError;
use crate::executor::{default_shell, ExecutorConfig};

/// Config file looked up next to the plan file
pub const FILE_NAME: &str = "weft.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub max_parallel: usize,
    pub continue_on_error: bool,
    pub dry_run: bool,
    /// Timeout in seconds for tasks that do not declare one
    pub default_timeout_secs: Option<f64>,
    pub shell: Vec<String>,
    pub gates: GateSource,
    /// Run gates even when a task failed
    pub run_gates_after_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallel: 1,
            continue_on_error: false,
            dry_run: false,
            default_timeout_secs: None,
            shell: default_shell(),
            gates: GateSource::default(),
            run_gates_after_failure: false,
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_parallel: Option<usize>,
    pub continue_on_error: bool,
    pub dry_run: bool,
    pub default_timeout_secs: Option<f64>,
    pub gates: Option<GateSource>,
}

impl EngineConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Load an explicit config file, else `weft.toml` beside the plan, else defaults.
    /// An explicit path that does not exist is an error.
    pub fn discover(
        explicit: Option<&Path>,
        plan_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = plan_path.map(|plan| {
            plan.parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .join(FILE_NAME)
        });
        match candidate {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == 0 {
            return Err(ConfigError::Invalid("max_parallel must be at least 1".to_string()));
        }
        if self.shell.is_empty() || self.shell[0].trim().is_empty() {
            return Err(ConfigError::Invalid("shell must name a program".to_string()));
        }
        if let Some(secs) = self.default_timeout_secs {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "default_timeout_secs must be a positive number of seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }

    /// Apply command-line overrides and re-validate
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(max_parallel) = overrides.max_parallel {
            self.max_parallel = max_parallel;
        }
        self.continue_on_error |= overrides.continue_on_error;
        self.dry_run |= overrides.dry_run;
        if let Some(secs) = overrides.default_timeout_secs {
            self.default_timeout_secs = Some(secs);
        }
        if let Some(gates) = overrides.gates {
            self.gates = gates;
        }
        self.validate()?;
        Ok(self)
    }

    /// Default task timeout, if one is set and representable
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Executor settings, with relative task directories resolved against `base_dir`
    pub fn executor_config(&self, base_dir: Option<PathBuf>) -> ExecutorConfig {
        let mut config = ExecutorConfig::default()
            .with_max_parallel(self.max_parallel)
            .with_continue_on_error(self.continue_on_error)
            .with_dry_run(self.dry_run)
            .with_shell(self.shell.iter().cloned());
        if let Some(timeout) = self.default_timeout() {
            config = config.with_default_timeout(timeout);
        }
        if let Some(dir) = base_dir {
            config = config.with_base_dir(dir);
        }
        config
    }
}
