// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

const VARS: &[&str] = &[
    "FORGE_STATE_DIR",
    "XDG_STATE_HOME",
    "FORGE_CONFIG",
    "FORGE_IPC_TIMEOUT_MS",
    "FORGE_JOB_TIMEOUT_MS",
    "FORGE_PROGRESS_INTERVAL_MS",
    "FORGE_CANCEL_GRACE_MS",
    "FORGE_LOG",
];

/// Restores the listed variables when dropped.
struct EnvGuard(Vec<(&'static str, Option<String>)>);

impl EnvGuard {
    fn clear() -> Self {
        let saved = VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        for key in VARS {
            std::env::remove_var(key);
        }
        Self(saved)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.0 {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn state_dir_prefers_explicit_override() {
    let _env = EnvGuard::clear();
    std::env::set_var("XDG_STATE_HOME", "/xdg");
    std::env::set_var("FORGE_STATE_DIR", "/srv/forge");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/srv/forge"));
}

#[test]
#[serial]
fn state_dir_falls_back_to_xdg() {
    let _env = EnvGuard::clear();
    std::env::set_var("XDG_STATE_HOME", "/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/xdg/forge"));
}

#[test]
#[serial]
fn empty_override_is_ignored() {
    let _env = EnvGuard::clear();
    std::env::set_var("FORGE_STATE_DIR", "");
    std::env::set_var("XDG_STATE_HOME", "/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/xdg/forge"));
}

#[test]
#[serial]
fn config_path_defaults_into_state_dir() {
    let _env = EnvGuard::clear();
    assert_eq!(config_path(Path::new("/state")), PathBuf::from("/state/forge.toml"));
    std::env::set_var("FORGE_CONFIG", "/etc/forge.toml");
    assert_eq!(config_path(Path::new("/state")), PathBuf::from("/etc/forge.toml"));
}

#[test]
#[serial]
fn durations_use_defaults_when_unset_or_invalid() {
    let _env = EnvGuard::clear();
    assert_eq!(ipc_timeout(), Duration::from_secs(5));
    assert_eq!(job_timeout(), DEFAULT_DEADLINE);
    assert_eq!(progress_interval(), DEFAULT_PROGRESS_INTERVAL);
    assert_eq!(cancel_grace(), DEFAULT_CANCEL_GRACE);

    std::env::set_var("FORGE_JOB_TIMEOUT_MS", "soon");
    assert_eq!(job_timeout(), DEFAULT_DEADLINE);
}

#[yare::parameterized(
    ipc      = { "FORGE_IPC_TIMEOUT_MS", ipc_timeout },
    job      = { "FORGE_JOB_TIMEOUT_MS", job_timeout },
    progress = { "FORGE_PROGRESS_INTERVAL_MS", progress_interval },
    grace    = { "FORGE_CANCEL_GRACE_MS", cancel_grace },
)]
#[serial]
fn durations_read_milliseconds(key: &str, read: fn() -> Duration) {
    let _env = EnvGuard::clear();
    std::env::set_var(key, " 1500 ");
    assert_eq!(read(), Duration::from_millis(1500));
}

#[test]
#[serial]
fn log_filter_falls_back_to_info() {
    let _env = EnvGuard::clear();
    assert_eq!(log_filter(), "info");
    std::env::set_var("FORGE_LOG", "forge_engine=debug");
    assert_eq!(log_filter(), "forge_engine=debug");
}
