// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use forge_core::{JobId, QueueSnapshot};
use serde::{Deserialize, Serialize};

/// Response from the daemon to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Response {
    Pong { uptime_secs: u64 },

    Status { snapshot: QueueSnapshot },

    /// Build accepted. `position` is 0 when nothing is ahead of it.
    Submitted { job_id: JobId, position: usize },

    Cancelled { app_name: String, runtime_secs: u64 },

    NothingRunning,

    NothingToRetry,

    Log { path: PathBuf, tail: String },

    NoLog,

    /// Daemon is shutting down
    ShuttingDown,

    /// Request was understood but could not be served
    Error { message: String },
}
