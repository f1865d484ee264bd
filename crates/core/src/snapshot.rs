// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queue views for status polling.

use crate::id::JobId;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the queue. Computed on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub current: Option<CurrentJob>,
    pub queued: Vec<QueuedJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentJob {
    pub job_id: JobId,
    pub app_name: String,
    pub account_name: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedJob {
    /// Count of unfinished jobs strictly ahead, the running one included.
    /// 0 while the slot is free but not yet refilled after a cancel.
    pub position: usize,
    pub job_id: JobId,
    pub app_name: String,
    pub account_name: String,
    pub waiting_ms: u64,
}

impl QueueSnapshot {
    /// Nothing running and nothing waiting
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queued.is_empty()
    }
}
