//! Delivering the reload signal.

use crate::core::{ReloadSignal, ReloadTarget};
use crate::error::{ReloaderError, Result};
use nix::errno::Errno;
use nix::sys::signal;
use nix::unistd::Pid;
use tracing::info;

/// An OS primitive that delivers a signal to a PID.
///
/// Implementations report failure but do not check for process existence
/// themselves.
pub trait SignalSender: Send + Sync {
    /// Deliver `signal` to `pid`.
    fn send(&self, pid: i32, signal: ReloadSignal) -> std::result::Result<(), Errno>;
}

/// Delivers signals with `kill(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KillSender;

impl SignalSender for KillSender {
    fn send(&self, pid: i32, reload_signal: ReloadSignal) -> std::result::Result<(), Errno> {
        signal::kill(Pid::from_raw(pid), reload_signal.as_signal())
    }
}

/// Sends the configured reload signal to a resolved PID.
pub struct SignalDispatcher<S = KillSender> {
    sender: S,
    signal: ReloadSignal,
}

impl SignalDispatcher<KillSender> {
    /// Create a dispatcher that delivers `signal` with `kill(2)`.
    pub fn new(signal: ReloadSignal) -> Self {
        Self {
            sender: KillSender,
            signal,
        }
    }
}

impl<S: SignalSender> SignalDispatcher<S> {
    /// Create a dispatcher backed by a custom sender.
    pub fn with_sender(sender: S, signal: ReloadSignal) -> Self {
        Self { sender, signal }
    }

    /// Deliver the signal to `pid`, logging how the PID was found.
    ///
    /// # Errors
    ///
    /// Returns `ReloaderError::SignalDelivery` wrapping the OS error, e.g.
    /// `EPERM` or `ESRCH`.
    pub fn dispatch(&self, pid: i32, target: &ReloadTarget) -> Result<()> {
        self.sender
            .send(pid, self.signal)
            .map_err(|source| ReloaderError::SignalDelivery {
                pid,
                signal: self.signal,
                source,
            })?;

        match target {
            ReloadTarget::ByPidFile(path) => {
                info!("signal {} sent to pid {} (from {})", self.signal, pid, path.display())
            }
            ReloadTarget::ByName(name) => {
                info!("signal {} sent to {} (pid: {})", self.signal, name, pid)
            }
        }

        Ok(())
    }
}
