//! Core configuration types.

mod settings;
mod signal;

pub use settings::{ReloadTarget, ReloaderConfig, WatchTarget};
pub use signal::ReloadSignal;
