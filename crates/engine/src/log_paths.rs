// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log file path builders.
//!
//! Each job gets one file: `<log_dir>/<timestamp>-<slug>.log`, where the
//! timestamp is UTC ISO-8601 with `:` and `.` replaced by `-`.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// `2026-01-30T08-14-09-123Z` for the given wall-clock millis.
pub fn log_timestamp(epoch_ms: u64) -> String {
    let at = i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default();
    at.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Build the path to a job's log file.
pub fn job_log_path(log_dir: &Path, epoch_ms: u64, slug: &str) -> PathBuf {
    log_dir.join(format!("{}-{}.log", log_timestamp(epoch_ms), slug))
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
