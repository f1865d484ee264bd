// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forged`: the build queue daemon.

use std::process::ExitCode;
use std::sync::Arc;

use forge_adapters::{DesktopSink, FanoutSink, LogSink, NotifySink};
use forge_daemon::{logging, startup, Config, LifecycleError, ListenCtx, Listener, StartupResult};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("forged: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = match logging::init(&config.log_path) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("forged: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "daemon failed");
            eprintln!("forged: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), LifecycleError> {
    info!(state_dir = %config.state_dir.display(), "starting daemon");
    let StartupResult { daemon, listener } = startup(&config).await?;

    let shutdown = Arc::new(Notify::new());
    let sink: Arc<dyn NotifySink> =
        Arc::new(FanoutSink::new(vec![Arc::new(LogSink), Arc::new(DesktopSink::new())]));
    let ctx = Arc::new(ListenCtx {
        queue: daemon.queue.clone(),
        accounts: Arc::clone(&daemon.accounts),
        sink,
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
    });
    let listener_task = tokio::spawn(Listener::new(listener, ctx).run());

    println!("READY");
    info!(socket = %config.socket_path.display(), "daemon ready");

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "failed to wait for ctrl-c");
            }
            info!("interrupted");
        }
        _ = sigterm.recv() => info!("received SIGTERM"),
        () = shutdown.notified() => {}
    }

    listener_task.abort();
    daemon.shutdown();
    Ok(())
}
