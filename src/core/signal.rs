//! The signal delivered to the target process on reload.

use crate::error::ValidationError;
use nix::sys::signal::Signal;
use std::fmt;
use std::str::FromStr;

/// The OS signal sent to the target process on every reload.
///
/// Resolved once at startup from a symbolic name. Defaults to `SIGHUP`,
/// the conventional "re-read your configuration" signal.
///
/// # Examples
///
/// ```rust
/// use config_reloader::core::ReloadSignal;
///
/// let signal = ReloadSignal::parse("SIGUSR1").unwrap();
/// assert_eq!(signal.to_string(), "SIGUSR1");
/// assert_eq!(ReloadSignal::default().to_string(), "SIGHUP");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal(Signal);

impl ReloadSignal {
    /// Resolve a symbolic signal name.
    ///
    /// `SIGUSR1` is the canonical form; `sigusr1` and `USR1` are accepted too.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `RELOAD_SIGNAL` if the name is not
    /// a signal known to this platform.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let upper = name.trim().to_ascii_uppercase();
        let canonical = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{}", upper)
        };

        Signal::from_str(&canonical).map(Self).map_err(|_| {
            ValidationError::invalid_field(
                "RELOAD_SIGNAL",
                format!("cannot find signal for {}", name),
            )
        })
    }

    /// The underlying `nix` signal.
    pub fn as_signal(&self) -> Signal {
        self.0
    }
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self(Signal::SIGHUP)
    }
}

impl From<Signal> for ReloadSignal {
    fn from(signal: Signal) -> Self {
        Self(signal)
    }
}

impl fmt::Display for ReloadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
