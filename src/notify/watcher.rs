//! Registering the watch set with the filesystem notification backend.

use crate::core::WatchTarget;
use crate::error::{ReloaderError, Result};
use crate::notify::ChangeEvent;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// The two output streams of the notification backend.
///
/// `events` carries change notifications and `errors` carries transport
/// errors. Each closes independently.
pub struct ChangeStreams {
    /// Change notifications, in backend order
    pub events: mpsc::UnboundedReceiver<ChangeEvent>,
    /// Errors reported by the backend itself
    pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

impl ChangeStreams {
    /// Bundle two receivers.
    pub fn new(
        events: mpsc::UnboundedReceiver<ChangeEvent>,
        errors: mpsc::UnboundedReceiver<notify::Error>,
    ) -> Self {
        Self { events, errors }
    }
}

/// Owns the OS watch on every configured directory.
///
/// Dropping the handle releases the watch and closes both streams.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl WatchHandle {
    /// The registered directories, in configuration order.
    pub fn watched_paths(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Open a non-recursive watch on every directory of `target`.
///
/// Only direct children of each directory are observed. Access events are
/// dropped at the source; everything else is forwarded as a `ChangeEvent`.
///
/// # Examples
///
/// ```rust,no_run
/// use config_reloader::core::WatchTarget;
/// use config_reloader::notify::open_watch_set;
///
/// # async fn example() -> config_reloader::error::Result<()> {
/// let target = WatchTarget::parse("/etc/nginx,/etc/nginx/conf.d")?;
/// let (handle, mut streams) = open_watch_set(&target)?;
///
/// while let Some(event) = streams.events.recv().await {
///     println!("{} changed", event.path.display());
/// }
/// drop(handle);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails if the backend cannot be created or if any directory cannot be
/// registered. There is no partial success.
pub fn open_watch_set(target: &WatchTarget) -> Result<(WatchHandle, ChangeStreams)> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<ChangeEvent>();
    let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if let Some(change) = ChangeEvent::from_notify(&event) {
                let _ = event_tx.send(change);
            }
        }
        Err(e) => {
            let _ = error_tx.send(e);
        }
    })
    .map_err(ReloaderError::WatcherInit)?;

    for dir in target.dirs() {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| ReloaderError::WatchSetup {
                path: dir.clone(),
                source,
            })?;
    }

    Ok((
        WatchHandle {
            _watcher: watcher,
            dirs: target.dirs().to_vec(),
        },
        ChangeStreams::new(event_rx, error_rx),
    ))
}
