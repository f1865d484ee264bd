// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-slot memory of the most recently finished job.

use forge_core::{BuildConfig, JobId, Outcome};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// The last job to reach a terminal state.
#[derive(Debug, Clone)]
pub struct LastOutcome {
    pub job_id: JobId,
    pub config: Arc<BuildConfig>,
    pub outcome: Outcome,
    /// Log artifact of the job, for the "show last log" view
    pub log_path: Option<PathBuf>,
    pub completed_at_ms: u64,
}

/// Overwritten on every settlement; not a history.
#[derive(Debug, Default)]
pub struct LastOutcomeCache {
    slot: Mutex<Option<LastOutcome>>,
}

impl LastOutcomeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, last: LastOutcome) {
        *self.slot.lock() = Some(last);
    }

    pub fn get(&self) -> Option<LastOutcome> {
        self.slot.lock().clone()
    }
}
