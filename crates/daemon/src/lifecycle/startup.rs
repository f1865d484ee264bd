// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: lock, configuration, queue, socket.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use forge_core::SystemClock;
use forge_engine::{JobQueue, ProcessSupervisor, QueueConfig};
use fs2::FileExt;
use tokio::net::UnixListener;
use tracing::{info, warn};

use super::{Config, DaemonState, LifecycleError, StartupResult};
use crate::config::ForgeConfig;
use crate::env;

/// Start the daemon. On failure, removes whatever this attempt created,
/// unless another daemon holds the lock.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let forge = ForgeConfig::load(&config.config_path)?;
    let accounts = forge.resolve_accounts(|var| std::env::var(var).ok())?;
    if accounts.is_empty() {
        warn!(config = %config.config_path.display(), "no accounts configured, submissions will be rejected");
    }
    tokio::fs::create_dir_all(&forge.log_dir).await?;

    let supervisor = forge
        .supervisor_config()
        .deadline(env::job_timeout())
        .progress_interval(env::progress_interval());
    info!(
        agent = %supervisor.program,
        workspace = %supervisor.workspace_root.display(),
        logs = %forge.log_dir.display(),
        accounts = ?accounts.keys().collect::<Vec<_>>(),
        "configuration loaded"
    );
    let queue = JobQueue::new(
        Arc::new(ProcessSupervisor::new(supervisor, SystemClock)),
        QueueConfig::new(forge.log_dir.clone()).cancel_grace(env::cancel_grace()),
        SystemClock,
    );

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;
    info!(socket = %config.socket_path.display(), "listening");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            accounts: Arc::new(accounts),
            queue,
            start_time: Instant::now(),
        },
        listener,
    })
}

fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.lock_path] {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "cleanup after failed startup");
            }
        }
    }
}
