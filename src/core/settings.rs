//! Validated, immutable reloader configuration.

use crate::core::ReloadSignal;
use crate::error::{Result, ValidationError};
use crate::sources::{EnvSource, RawSettings};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// The ordered list of directories to watch.
///
/// Order follows `CONFIG_DIR`. Duplicates are kept; registering the same
/// directory twice is harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    dirs: Vec<PathBuf>,
}

impl WatchTarget {
    /// Parse a comma-separated directory list.
    ///
    /// Entries are trimmed. An empty list, or an empty entry such as the
    /// middle of `a,,b`, is rejected.
    pub fn parse(list: &str) -> std::result::Result<Self, ValidationError> {
        let mut dirs = Vec::new();
        for entry in list.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(ValidationError::invalid_field(
                    "CONFIG_DIR",
                    format!("empty directory entry in {:?}", list),
                ));
            }
            dirs.push(PathBuf::from(entry));
        }

        Ok(Self { dirs })
    }

    /// Build a watch target from explicit paths.
    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// The directories, in configuration order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dir) in self.dirs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", dir.display())?;
        }
        Ok(())
    }
}

/// How the process to reload is found.
///
/// Exactly one variant is configured for the lifetime of the reloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadTarget {
    /// Look the process up by executable name in the live process table.
    ByName(String),
    /// Read the PID from a file.
    ByPidFile(PathBuf),
}

impl ReloadTarget {
    /// The PID file path, if this target is file based.
    pub fn pid_file(&self) -> Option<&Path> {
        match self {
            Self::ByPidFile(path) => Some(path),
            Self::ByName(_) => None,
        }
    }
}

impl fmt::Display for ReloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName(name) => write!(f, "PROCESS_NAME={}", name),
            Self::ByPidFile(path) => write!(f, "PROCESS_PID_FILE={}", path.display()),
        }
    }
}

/// Process-wide configuration, read once at startup.
///
/// # Examples
///
/// ```rust
/// use config_reloader::core::{ReloadTarget, ReloaderConfig};
/// use config_reloader::sources::EnvSource;
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([
///     ("CONFIG_DIR".to_string(), "/etc/nginx,/etc/nginx/conf.d".to_string()),
///     ("PROCESS_NAME".to_string(), "nginx".to_string()),
/// ]);
/// let config = ReloaderConfig::load(&EnvSource::from_vars(vars)).unwrap();
/// assert_eq!(config.watch.dirs().len(), 2);
/// assert_eq!(config.target, ReloadTarget::ByName("nginx".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloaderConfig {
    /// Directories to watch
    pub watch: WatchTarget,
    /// Process to signal
    pub target: ReloadTarget,
    /// Signal to send
    pub signal: ReloadSignal,
    /// Log every raw change event
    pub verbose: bool,
}

impl ReloaderConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ReloaderError::Config` on any missing, conflicting or invalid
    /// variable.
    pub fn from_env() -> Result<Self> {
        Self::load(&EnvSource::new())
    }

    /// Load configuration from the given source.
    ///
    /// # Errors
    ///
    /// Returns `ReloaderError::Config` on any missing, conflicting or invalid
    /// variable.
    pub fn load(source: &EnvSource) -> Result<Self> {
        let raw = source.load()?;
        Ok(Self::from_raw(raw)?)
    }

    /// Validate raw settings into a configuration.
    ///
    /// # Errors
    ///
    /// - `CONFIG_DIR` missing or containing an empty entry
    /// - both or neither of `PROCESS_NAME` and `PROCESS_PID_FILE` set
    /// - `RELOAD_SIGNAL` set to an unknown signal
    pub fn from_raw(raw: RawSettings) -> std::result::Result<Self, ValidationError> {
        let config_dir = raw.config_dir.ok_or_else(|| {
            ValidationError::custom("mandatory env var CONFIG_DIR is empty")
        })?;
        let watch = WatchTarget::parse(&config_dir)?;

        let target = match (raw.process_name, raw.process_pid_file) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::custom(
                    "PROCESS_NAME and PROCESS_PID_FILE are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(ValidationError::custom(
                    "one of PROCESS_NAME or PROCESS_PID_FILE must be set",
                ));
            }
            (Some(name), None) => ReloadTarget::ByName(name),
            (None, Some(path)) => ReloadTarget::ByPidFile(PathBuf::from(path)),
        };

        let signal = match raw.reload_signal {
            Some(name) => ReloadSignal::parse(&name)?,
            None => {
                let signal = ReloadSignal::default();
                info!("RELOAD_SIGNAL is empty, defaulting to {}", signal);
                signal
            }
        };

        let verbose = raw.verbose.as_deref().map(str::trim) == Some("true");

        Ok(Self {
            watch,
            target,
            signal,
            verbose,
        })
    }
}
