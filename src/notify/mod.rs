//! Change notification pipeline.
//!
//! [`open_watch_set`] registers the configured directories and yields two
//! streams; [`ReloadTrigger`] drains them and runs one reload attempt per
//! qualifying change.

mod event;
mod trigger;
mod watcher;

pub use event::{ChangeEvent, ChangeKind};
pub use trigger::{ReloadTrigger, TriggerStats};
pub use watcher::{ChangeStreams, WatchHandle, open_watch_set};
