//! Error types for config-reloader.

use crate::core::ReloadSignal;
use std::fmt;
use std::path::PathBuf;

/// Result type alias for config-reloader operations.
pub type Result<T> = std::result::Result<T, ReloaderError>;

/// Errors that can occur while configuring, watching or reloading.
///
/// `Config`, `WatcherInit` and `WatchSetup` only happen during startup and
/// terminate the process. Every other variant is produced while handling a
/// single change event; it is logged and the event loop carries on.
#[derive(Debug, thiserror::Error)]
pub enum ReloaderError {
    /// Missing, conflicting or invalid environment configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The filesystem notification backend could not be created.
    #[error("Failed to create file watcher: {0}")]
    WatcherInit(#[source] notify::Error),

    /// A directory of the watch set could not be registered.
    #[error("Failed to watch {}: {source}", .path.display())]
    WatchSetup {
        /// The directory that failed to register
        path: PathBuf,
        /// The underlying watcher error
        source: notify::Error,
    },

    /// The PID file is unreadable, empty or does not hold a valid PID.
    #[error("Invalid pid file {}: {reason}", .path.display())]
    InvalidPidFile {
        /// Path of the PID file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// No live process has the requested executable name.
    #[error("No process matching {0} found")]
    ProcessNotFound(String),

    /// The process table could not be enumerated.
    #[error("Failed to list processes: {0}")]
    ProcessListFailure(String),

    /// The OS refused to deliver the signal.
    #[error("Could not send signal {signal} to pid {pid}: {source}")]
    SignalDelivery {
        /// Target process identifier
        pid: i32,
        /// Signal that was being delivered
        signal: ReloadSignal,
        /// The errno reported by `kill(2)`
        source: nix::errno::Errno,
    },

    /// The notification source itself reported an error.
    #[error("Watch transport error: {0}")]
    Transport(#[source] notify::Error),
}

impl ReloaderError {
    /// Whether this error belongs to the startup classes that end the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::WatcherInit(_) | Self::WatchSetup { .. })
    }

    pub(crate) fn invalid_pid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Validation error for environment settings.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific variable has an invalid value.
    InvalidField {
        /// The environment variable name
        field: String,
        /// The reason why it's invalid
        reason: String,
    },
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "{} is invalid: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ReloaderError {
    fn from(err: ValidationError) -> Self {
        ReloaderError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classes() {
        assert!(ReloaderError::Config("x".into()).is_fatal());
        assert!(!ReloaderError::ProcessNotFound("myapp".into()).is_fatal());
        assert!(!ReloaderError::invalid_pid_file("/tmp/app.pid", "empty").is_fatal());
        assert!(!ReloaderError::ProcessListFailure("unsupported".into()).is_fatal());
    }

    #[test]
    fn test_validation_error_converts_to_config() {
        let err: ReloaderError =
            ValidationError::invalid_field("RELOAD_SIGNAL", "unknown signal SIGFOO").into();
        match err {
            ReloaderError::Config(msg) => {
                assert_eq!(msg, "RELOAD_SIGNAL is invalid: unknown signal SIGFOO")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pid_file_message_names_path() {
        let err = ReloaderError::invalid_pid_file("/tmp/app.pid", "file is empty");
        assert_eq!(err.to_string(), "Invalid pid file /tmp/app.pid: file is empty");
    }
}
