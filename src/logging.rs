//! Logging initialisation.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Lines go to standard error. The filter defaults to `info` and can be
/// overridden with `RUST_LOG`.
///
/// # Panics
///
/// If a global subscriber has already been installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
