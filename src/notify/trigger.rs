//! Filtering change events and triggering reloads.

use crate::error::{ReloaderError, Result};
use crate::notify::{ChangeEvent, ChangeStreams};
use crate::process::ReloadAction;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{error, info};

/// Counters collected by a finished drain loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerStats {
    /// Change events received
    pub events: usize,
    /// Reload attempts made
    pub attempts: usize,
    /// Reload attempts that failed
    pub failures: usize,
    /// Transport errors received
    pub transport_errors: usize,
}

/// Consumes change notifications and runs one reload attempt per
/// qualifying event.
///
/// Permission-only changes are ignored. Bursts are not coalesced: an editor
/// that writes and then renames produces two attempts. Attempts run one at a
/// time, in event order. The attempt itself (PID file read, process table
/// scan, `kill`) is blocking and is moved off the async worker when running
/// on a multi-threaded runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use config_reloader::core::{ReloadSignal, ReloadTarget, WatchTarget};
/// use config_reloader::notify::{ReloadTrigger, open_watch_set};
/// use config_reloader::process::Reloader;
///
/// # async fn example() -> config_reloader::error::Result<()> {
/// let (_handle, streams) = open_watch_set(&WatchTarget::parse("/etc/nginx")?)?;
/// let reloader = Reloader::new(ReloadTarget::ByName("nginx".into()), ReloadSignal::default());
///
/// ReloadTrigger::new(reloader).run(streams).await;
/// # Ok(())
/// # }
/// ```
pub struct ReloadTrigger<R> {
    action: R,
    verbose: bool,
}

impl<R: ReloadAction> ReloadTrigger<R> {
    /// Create a trigger around a reload action.
    pub fn new(action: R) -> Self {
        Self {
            action,
            verbose: false,
        }
    }

    /// Log every raw event, including ignored ones.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Handle one change event.
    ///
    /// Returns `None` if the event was ignored, otherwise the outcome of the
    /// reload attempt. A failed attempt is logged here and not retried.
    pub fn handle_event(&self, event: &ChangeEvent) -> Option<Result<()>> {
        if self.verbose {
            info!("event: {}", event);
        }

        if !event.kind.triggers_reload() {
            return None;
        }

        info!("modified file: {}", event.path.display());
        let result = run_blocking(|| self.action.reload());
        if let Err(e) = &result {
            error!("reload failed: {}", e);
        }
        Some(result)
    }

    /// Report an error from the notification backend.
    pub fn handle_transport_error(&self, err: notify::Error) {
        error!("{}", ReloaderError::Transport(err));
    }

    /// Drain both streams until they are closed.
    ///
    /// A closed stream stops being polled; the other keeps being served.
    pub async fn run(&self, mut streams: ChangeStreams) -> TriggerStats {
        let mut stats = TriggerStats::default();
        let mut events_open = true;
        let mut errors_open = true;

        while events_open || errors_open {
            tokio::select! {
                event = streams.events.recv(), if events_open => match event {
                    Some(event) => {
                        stats.events += 1;
                        if let Some(result) = self.handle_event(&event) {
                            stats.attempts += 1;
                            if result.is_err() {
                                stats.failures += 1;
                            }
                        }
                    }
                    None => events_open = false,
                },
                err = streams.errors.recv(), if errors_open => match err {
                    Some(err) => {
                        stats.transport_errors += 1;
                        self.handle_transport_error(err);
                    }
                    None => errors_open = false,
                },
            }
        }

        stats
    }
}

// block_in_place panics on a current-thread runtime and needs a runtime
// context to hand the worker off.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeKind;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct CountingAction {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ReloadAction for CountingAction {
        fn reload(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ReloaderError::ProcessNotFound("myapp".into()))
            } else {
                Ok(())
            }
        }
    }

    fn streams() -> (
        mpsc::UnboundedSender<ChangeEvent>,
        mpsc::UnboundedSender<notify::Error>,
        ChangeStreams,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        (event_tx, error_tx, ChangeStreams::new(event_rx, error_rx))
    }

    #[test]
    fn test_permission_change_ignored() {
        let action = Arc::new(CountingAction::default());
        let trigger = ReloadTrigger::new(Arc::clone(&action)).with_verbose(true);

        let outcome = trigger.handle_event(&ChangeEvent::new("/etc/app/a.conf", ChangeKind::Permission));
        assert!(outcome.is_none());
        assert_eq!(action.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_write_triggers_one_attempt() {
        let action = Arc::new(CountingAction::default());
        let trigger = ReloadTrigger::new(Arc::clone(&action));

        let outcome = trigger.handle_event(&ChangeEvent::new("/etc/app/a.conf", ChangeKind::Write));
        assert!(matches!(outcome, Some(Ok(()))));
        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_attempt_is_returned() {
        let action = CountingAction {
            fail: true,
            ..Default::default()
        };
        let trigger = ReloadTrigger::new(action);

        let outcome = trigger.handle_event(&ChangeEvent::new("/etc/app/a.conf", ChangeKind::Remove));
        assert!(matches!(
            outcome,
            Some(Err(ReloaderError::ProcessNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_one_attempt_per_qualifying_event() {
        let action = Arc::new(CountingAction::default());
        let trigger = ReloadTrigger::new(Arc::clone(&action));
        let (event_tx, error_tx, streams) = streams();

        for kind in [
            ChangeKind::Create,
            ChangeKind::Write,
            ChangeKind::Permission,
            ChangeKind::Rename,
            ChangeKind::Permission,
            ChangeKind::Remove,
            ChangeKind::Unknown,
        ] {
            event_tx.send(ChangeEvent::new("/etc/app/a.conf", kind)).unwrap();
        }
        drop(event_tx);
        drop(error_tx);

        let stats = trigger.run(streams).await;
        assert_eq!(stats.events, 7);
        assert_eq!(stats.attempts, 5);
        assert_eq!(stats.failures, 0);
        assert_eq!(action.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_run_continues_after_failures_and_transport_errors() {
        let action = Arc::new(CountingAction {
            fail: true,
            ..Default::default()
        });
        let trigger = ReloadTrigger::new(Arc::clone(&action));
        let (event_tx, error_tx, streams) = streams();

        event_tx.send(ChangeEvent::new("/etc/app/a.conf", ChangeKind::Write)).unwrap();
        error_tx.send(notify::Error::generic("inotify queue overflow")).unwrap();
        event_tx.send(ChangeEvent::new("/etc/app/b.conf", ChangeKind::Write)).unwrap();
        drop(event_tx);
        drop(error_tx);

        let stats = trigger.run(streams).await;
        assert_eq!(
            stats,
            TriggerStats {
                events: 2,
                attempts: 2,
                failures: 2,
                transport_errors: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_closed_error_stream_keeps_events_flowing() {
        let action = Arc::new(CountingAction::default());
        let trigger = ReloadTrigger::new(Arc::clone(&action));
        let (event_tx, error_tx, streams) = streams();

        drop(error_tx);
        let producer = tokio::spawn(async move {
            for _ in 0..3 {
                tokio::task::yield_now().await;
                event_tx
                    .send(ChangeEvent::new("/etc/app/a.conf", ChangeKind::Write))
                    .unwrap();
            }
        });

        let stats = trigger.run(streams).await;
        producer.await.unwrap();
        assert_eq!(stats.attempts, 3);
    }

    /// Blocks until another task on the runtime sets the flag.
    struct WaitForFlag {
        flag: Arc<AtomicBool>,
    }

    impl ReloadAction for WaitForFlag {
        fn reload(&self) -> Result<()> {
            for _ in 0..200 {
                if self.flag.load(Ordering::SeqCst) {
                    return Ok(());
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(ReloaderError::ProcessNotFound("flag never set".into()))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_blocking_attempt_leaves_worker_free() {
        let flag = Arc::new(AtomicBool::new(false));
        let trigger = ReloadTrigger::new(WaitForFlag {
            flag: Arc::clone(&flag),
        });
        let (event_tx, error_tx, streams) = streams();
        event_tx.send(ChangeEvent::new("/etc/app/a.conf", ChangeKind::Write)).unwrap();
        drop(event_tx);
        drop(error_tx);

        let drain = tokio::spawn(async move { trigger.run(streams).await });
        let setter = tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        let stats = drain.await.unwrap();
        setter.await.unwrap();
        assert_eq!(stats.attempts, 1);
        assert_eq!(stats.failures, 0);
    }
}
