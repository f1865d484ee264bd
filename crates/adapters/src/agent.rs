// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent process launcher.
//!
//! The agent runs with a cleared environment: only allow-listed variables
//! from the orchestrator plus whatever the caller adds explicitly reach it.

use nix::sys::signal::{self, Signal};
use nix::unistd::{Gid, Pid, Uid};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

/// Errors from agent process operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("workspace error: {0}")]
    WorkspaceError(String),
    #[error("failed to signal pid {pid}: {source}")]
    SignalFailed {
        pid: u32,
        #[source]
        source: nix::Error,
    },
}

/// Reduced-privilege identity the agent runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecIdentity {
    pub uid: u32,
    pub gid: u32,
    pub user: String,
    pub home: PathBuf,
}

/// Everything needed to start one agent process.
#[derive(Debug, Clone)]
pub struct AgentLaunch {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub identity: Option<ExecIdentity>,
    /// Final environment, in insertion order
    pub env: Vec<(String, String)>,
}

impl AgentLaunch {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            identity: None,
            env: Vec::new(),
        }
    }

    forge_core::setters! {
        set {
            args: Vec<String>,
        }
        option {
            identity: ExecIdentity,
        }
    }

    /// Copy the named variables from the orchestrator's environment, skipping unset ones.
    pub fn inherit_env(mut self, allow: &[String]) -> Self {
        for key in allow {
            if let Ok(value) = std::env::var(key) {
                self.env.push((key.clone(), value));
            }
        }
        self
    }

    /// Add one variable, replacing an earlier value for the same key.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.into()));
        self
    }

    /// Build the command with all three stdio streams piped.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(identity) = &self.identity {
            cmd.uid(identity.uid).gid(identity.gid);
            cmd.env("HOME", &identity.home).env("USER", &identity.user);
        }
        // Explicit entries win over identity defaults.
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn spawn(&self) -> Result<Child, AgentError> {
        if !self.cwd.is_dir() {
            return Err(AgentError::WorkspaceError(format!(
                "working directory does not exist: {}",
                self.cwd.display()
            )));
        }
        let child = self
            .command()
            .spawn()
            .map_err(|source| AgentError::SpawnFailed { program: self.program.clone(), source })?;
        tracing::info!(
            program = %self.program,
            cwd = %self.cwd.display(),
            pid = child.id(),
            uid = self.identity.as_ref().map(|i| i.uid),
            "agent process spawned"
        );
        Ok(child)
    }
}

/// Create the agent's working directory and hand it to the agent identity.
pub async fn prepare_workspace(dir: &Path, identity: Option<&ExecIdentity>) -> Result<(), AgentError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        AgentError::WorkspaceError(format!("cannot create {}: {}", dir.display(), e))
    })?;
    if let Some(identity) = identity {
        nix::unistd::chown(
            dir,
            Some(Uid::from_raw(identity.uid)),
            Some(Gid::from_raw(identity.gid)),
        )
        .map_err(|e| {
            AgentError::WorkspaceError(format!(
                "cannot hand {} to {}: {}",
                dir.display(),
                identity.user,
                e
            ))
        })?;
    }
    Ok(())
}

/// Ask a process to stop with SIGTERM. A process that is already gone is not an error.
pub fn terminate(pid: u32) -> Result<(), AgentError> {
    let raw = i32::try_from(pid).map_err(|_| AgentError::SignalFailed {
        pid,
        source: nix::Error::EINVAL,
    })?;
    match signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) | Err(nix::Error::ESRCH) => Ok(()),
        Err(source) => Err(AgentError::SignalFailed { pid, source }),
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
