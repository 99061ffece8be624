//! Locating the target process and signalling it.

mod dispatcher;
mod locator;
mod reloader;

pub use dispatcher::{KillSender, SignalDispatcher, SignalSender};
pub use locator::{ProcessEntry, ProcessLocator, ProcessTable, SystemProcessTable, pid_from_file};
pub use reloader::{ReloadAction, Reloader};
