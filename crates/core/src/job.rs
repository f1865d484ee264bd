// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and its lifecycle state machine.

use crate::build_config::BuildConfig;
use crate::id::JobId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Lifecycle state of a job.
///
/// ```text
/// Queued ──▶ Running ──▶ Completed
///                   └──▶ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Cancelled,
    Completed,
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Running => "running",
        Cancelled => "cancelled",
        Completed => "completed",
    }
}

impl JobStatus {
    /// The full transition table. Everything not listed here is rejected.
    pub fn can_transition(self, to: JobStatus) -> bool {
        matches!(
            (self, to),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Cancelled)
                | (JobStatus::Running, JobStatus::Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Cancelled | JobStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One submitted build request and its lifecycle.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub config: Arc<BuildConfig>,
    status: JobStatus,
    pub added_at: Instant,
    /// Set on promotion to `Running`
    pub started_at: Option<Instant>,
    /// Log artifact, assigned on promotion
    pub log_path: Option<PathBuf>,
}

impl Job {
    pub fn new(id: JobId, config: Arc<BuildConfig>, added_at: Instant) -> Self {
        Self { id, config, status: JobStatus::Queued, added_at, started_at: None, log_path: None }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Move to `to`, rejecting edges outside the transition table.
    pub fn transition(&mut self, to: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition(to) {
            return Err(TransitionError { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }

    /// Promote a queued job.
    pub fn start(&mut self, now: Instant, log_path: PathBuf) -> Result<(), TransitionError> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(now);
        self.log_path = Some(log_path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
