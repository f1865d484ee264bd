// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal outcome of a job.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Exactly one of these is produced for every job that leaves `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        url: String,
        repo: String,
        summary: String,
    },
    /// The agent's session credentials expired; re-authenticate before retrying.
    AuthExpired,
    Failure {
        message: String,
        log_path: Option<PathBuf>,
    },
    /// Killed at the per-job deadline
    TimedOut {
        after_ms: u64,
        log_path: Option<PathBuf>,
    },
    Cancelled,
}

crate::simple_display! {
    Outcome {
        Success { .. } => "success",
        AuthExpired => "auth_expired",
        Failure { .. } => "failure",
        TimedOut { .. } => "timed_out",
        Cancelled => "cancelled",
    }
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
