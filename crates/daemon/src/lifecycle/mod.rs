// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use forge_core::SystemClock;
use forge_engine::JobQueue;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::config::{AccountBook, ConfigError};
use crate::env::{config_path, state_dir};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/forge)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the accounts file
    pub config_path: PathBuf,
}

impl Config {
    /// Load paths from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        Ok(Self { config_path: config_path(&state_dir), ..Self::for_state_dir(state_dir) })
    }

    /// Fixed layout under `state_dir`.
    pub fn for_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            config_path: state_dir.join("forge.toml"),
            state_dir,
        }
    }
}

/// Daemon state during operation.
///
/// The listener is returned separately from startup to be spawned as a Listener task.
pub struct DaemonState {
    pub config: Config,
    // Held to keep the exclusive lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub accounts: Arc<AccountBook>,
    pub queue: JobQueue<SystemClock>,
    pub start_time: Instant,
}

/// Result of daemon startup: the daemon state and the bound socket.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

impl DaemonState {
    /// Stop the running agent and remove the socket and lock files.
    pub fn shutdown(self) {
        info!("shutting down daemon");
        if let Some(cancelled) = self.queue.cancel() {
            info!(job_id = %cancelled.job_id, app = %cancelled.config.app_name, "stopped running job");
        }
        let waiting = self.queue.status().queued.len();
        if waiting > 0 {
            warn!(waiting, "dropping queued jobs");
        }
        for path in [&self.config.socket_path, &self.config.lock_path] {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }
        info!("daemon shutdown complete");
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory (set FORGE_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running? ({0})")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, #[source] std::io::Error),

    #[error("failed to start logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
