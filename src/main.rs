use config_reloader::logging::init_logging;
use config_reloader::prelude::*;
use std::process::ExitCode;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match ReloaderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}, exiting", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "starting with CONFIG_DIR={}, {}, RELOAD_SIGNAL={}",
        config.watch, config.target, config.signal
    );

    let (handle, streams) = match open_watch_set(&config.watch) {
        Ok(opened) => opened,
        Err(e) => {
            error!("{}, exiting", e);
            return ExitCode::FAILURE;
        }
    };
    info!("watching {}", config.watch);

    let trigger = ReloadTrigger::new(Reloader::new(config.target, config.signal))
        .with_verbose(config.verbose);

    // The drain task owns the watch handle until the runtime shuts down.
    let drain = tokio::spawn(async move {
        let _handle = handle;
        trigger.run(streams).await
    });

    tokio::select! {
        result = drain => {
            match result {
                Ok(stats) => error!(
                    "notification streams closed after {} events ({} reload attempts), exiting",
                    stats.events, stats.attempts
                ),
                Err(e) => error!("event loop stopped: {}, exiting", e),
            }
            ExitCode::FAILURE
        }
        signal = shutdown_signal() => {
            info!("received {}, shutting down", signal);
            ExitCode::SUCCESS
        }
    }
}

async fn shutdown_signal() -> &'static str {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}
