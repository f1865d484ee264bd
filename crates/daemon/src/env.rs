// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_engine::{DEFAULT_CANCEL_GRACE, DEFAULT_DEADLINE, DEFAULT_PROGRESS_INTERVAL};

use crate::lifecycle::LifecycleError;

/// Resolve state directory: FORGE_STATE_DIR > XDG_STATE_HOME/forge > ~/.local/state/forge
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = non_empty("FORGE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("forge"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/forge"))
}

/// Accounts file: FORGE_CONFIG, else `forge.toml` in the state directory
pub fn config_path(state_dir: &Path) -> PathBuf {
    non_empty("FORGE_CONFIG").map(PathBuf::from).unwrap_or_else(|| state_dir.join("forge.toml"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    duration_ms("FORGE_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Per-job deadline before the agent is killed
pub fn job_timeout() -> Duration {
    duration_ms("FORGE_JOB_TIMEOUT_MS").unwrap_or(DEFAULT_DEADLINE)
}

/// Minimum gap between progress notifications
pub fn progress_interval() -> Duration {
    duration_ms("FORGE_PROGRESS_INTERVAL_MS").unwrap_or(DEFAULT_PROGRESS_INTERVAL)
}

/// Pause after a cancel before the next job starts
pub fn cancel_grace() -> Duration {
    duration_ms("FORGE_CANCEL_GRACE_MS").unwrap_or(DEFAULT_CANCEL_GRACE)
}

/// Fallback log filter when RUST_LOG is unset
pub fn log_filter() -> String {
    non_empty("FORGE_LOG").unwrap_or_else(|| "info".to_string())
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn duration_ms(key: &str) -> Option<Duration> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
