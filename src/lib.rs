//! # config-reloader
//!
//! Watches configuration directories and signals a process to reload when
//! anything in them changes.
//!
//! ## Overview
//!
//! The pipeline is short:
//! - the watch set registers every configured directory with the OS
//!   notification backend (non-recursive)
//! - each change event that is not a bare permission change triggers one
//!   reload attempt
//! - a reload attempt resolves the target PID, by process name or from a PID
//!   file, and sends it the reload signal (`SIGHUP` unless configured)
//!
//! Failed attempts are logged and never retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use config_reloader::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! // CONFIG_DIR=/etc/nginx PROCESS_NAME=nginx
//! let config = ReloaderConfig::from_env()?;
//! let (_handle, streams) = open_watch_set(&config.watch)?;
//!
//! let reloader = Reloader::new(config.target.clone(), config.signal);
//! ReloadTrigger::new(reloader)
//!     .with_verbose(config.verbose)
//!     .run(streams)
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |---|---|
//! | `CONFIG_DIR` | comma-separated directories to watch (required) |
//! | `PROCESS_NAME` | executable name of the target |
//! | `PROCESS_PID_FILE` | file holding the target PID |
//! | `VERBOSE` | `true` logs every raw event |
//! | `RELOAD_SIGNAL` | signal name, defaults to `SIGHUP` |
//!
//! Exactly one of `PROCESS_NAME` and `PROCESS_PID_FILE` must be set.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod logging;
pub mod notify;
pub mod process;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ReloadSignal, ReloadTarget, ReloaderConfig, WatchTarget};
    pub use crate::error::{ReloaderError, Result, ValidationError};
    pub use crate::notify::{ReloadTrigger, open_watch_set};
    pub use crate::process::{ReloadAction, Reloader};
}
