// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only log artifact for one job's agent output.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Default read granularity for showing a finished job's log
pub const LOG_TAIL_CHARS: usize = 1900;

/// Append-only writer for a single job's log file.
///
/// stdout is written verbatim, stderr chunks get a `[STDERR] ` prefix.
///
/// Failures are logged via tracing and never propagate. After the first
/// write error the file is dropped and later appends are no-ops.
pub struct JobLog {
    path: PathBuf,
    file: Option<File>,
}

impl JobLog {
    /// Open (or create) the log file, creating parent directories.
    pub async fn open(path: PathBuf) -> Self {
        let file = match Self::open_file(&path).await {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open job log");
                None
            }
        };
        Self { path, file }
    }

    async fn open_file(path: &Path) -> std::io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        OpenOptions::new().create(true).append(true).open(path).await
    }

    pub async fn stdout(&mut self, chunk: &str) {
        self.write(chunk.as_bytes()).await;
    }

    pub async fn stderr(&mut self, chunk: &str) {
        self.write(format!("[STDERR] {}", chunk).as_bytes()).await;
    }

    /// Append a standalone marker line, e.g. `[EXIT] code 0`.
    pub async fn marker(&mut self, tag: &str, message: &str) {
        self.write(format!("\n[{}] {}\n", tag, message).as_bytes()).await;
    }

    async fn write(&mut self, bytes: &[u8]) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = file.write_all(bytes).await {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write job log");
            self.file = None;
        }
    }

    /// Flush buffered writes and close the file.
    pub async fn close(mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().await {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to flush job log");
            }
        }
    }
}

/// Read the last `max_chars` characters of a log, marking truncation.
pub async fn read_tail(path: &Path, max_chars: usize) -> std::io::Result<String> {
    let bytes = fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);
    let total = text.chars().count();
    if total <= max_chars {
        return Ok(text.into_owned());
    }
    let tail: String = text.chars().skip(total - max_chars).collect();
    Ok(format!("...(truncated)\n\n{}", tail))
}

#[cfg(test)]
#[path = "job_log_tests.rs"]
mod tests;
