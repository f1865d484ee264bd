// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Request from a client to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness probe
    Ping,

    /// Snapshot of the running and waiting jobs
    Status,

    /// Queue a new build.
    ///
    /// Fields carry the raw form input: `tech_stack` is comma-separated,
    /// `features` has one feature per line. Blank `tech_stack` and `design`
    /// fall back to the defaults.
    Submit {
        /// Key of a configured account
        account: String,
        app_name: String,
        description: String,
        #[serde(default)]
        tech_stack: String,
        #[serde(default)]
        design: String,
        #[serde(default)]
        features: String,
    },

    /// Stop the running build
    Cancel,

    /// Resubmit the most recently finished build
    Retry,

    /// Tail of the most recent job's log
    LastLog,

    /// Stop the daemon
    Shutdown,
}

impl Request {
    /// Requests polled often enough that they should not be logged at info.
    pub fn is_poll(&self) -> bool {
        matches!(self, Request::Ping | Request::Status)
    }
}
