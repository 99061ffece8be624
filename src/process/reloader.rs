//! The reload path: locate the target, then signal it.

use crate::core::{ReloadSignal, ReloadTarget};
use crate::error::Result;
use crate::process::{
    KillSender, ProcessLocator, ProcessTable, SignalDispatcher, SignalSender, SystemProcessTable,
};
use std::sync::Arc;

/// One reload attempt, triggered per qualifying change event.
pub trait ReloadAction: Send + Sync {
    /// Perform a single reload attempt.
    ///
    /// # Errors
    ///
    /// Returns the error that abandoned this attempt. Attempts are never
    /// retried.
    fn reload(&self) -> Result<()>;
}

impl<R: ReloadAction + ?Sized> ReloadAction for Arc<R> {
    fn reload(&self) -> Result<()> {
        (**self).reload()
    }
}

/// Resolves the configured target and sends it the reload signal.
///
/// # Examples
///
/// ```rust,no_run
/// use config_reloader::core::{ReloadSignal, ReloadTarget};
/// use config_reloader::process::{ReloadAction, Reloader};
///
/// let reloader = Reloader::new(
///     ReloadTarget::ByPidFile("/run/nginx.pid".into()),
///     ReloadSignal::default(),
/// );
/// reloader.reload()?;
/// # Ok::<(), config_reloader::error::ReloaderError>(())
/// ```
pub struct Reloader<T = SystemProcessTable, S = KillSender> {
    target: ReloadTarget,
    locator: ProcessLocator<T>,
    dispatcher: SignalDispatcher<S>,
}

impl Reloader<SystemProcessTable, KillSender> {
    /// Create a reloader using the OS process table and `kill(2)`.
    pub fn new(target: ReloadTarget, signal: ReloadSignal) -> Self {
        Self {
            target,
            locator: ProcessLocator::new(),
            dispatcher: SignalDispatcher::new(signal),
        }
    }
}

impl<T: ProcessTable, S: SignalSender> Reloader<T, S> {
    /// Create a reloader from explicit parts.
    pub fn with_parts(
        target: ReloadTarget,
        locator: ProcessLocator<T>,
        dispatcher: SignalDispatcher<S>,
    ) -> Self {
        Self {
            target,
            locator,
            dispatcher,
        }
    }
}

impl<T: ProcessTable, S: SignalSender> ReloadAction for Reloader<T, S> {
    fn reload(&self) -> Result<()> {
        let pid = self.locator.locate(&self.target)?;
        self.dispatcher.dispatch(pid, &self.target)
    }
}
