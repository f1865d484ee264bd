// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge_adapters::AgentError;
use forge_core::JobId;
use thiserror::Error;

/// Errors that stop a job before it can be classified.
///
/// The queue turns these into `Outcome::Failure`; they never escape it.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("job {0} has not been started")]
    NotStarted(JobId),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("failed waiting for agent process: {0}")]
    Wait(#[source] std::io::Error),
}
