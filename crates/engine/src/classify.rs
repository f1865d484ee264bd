// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-exit outcome classification.
//!
//! Priority order:
//! 1. an auth marker seen on stderr  -> `AuthExpired`
//! 2. a sentinel block on stdout     -> `Success`
//! 3. anything else                  -> `Failure`
//!
//! The sentinel the agent is asked to print:
//!
//! ```text
//! ---DEPLOYMENT_COMPLETE---
//! URL: <value>
//! REPO: <value>
//! SUMMARY: <value>
//! ---END---
//! ```

use forge_core::Outcome;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

pub const SENTINEL_START: &str = "---DEPLOYMENT_COMPLETE---";
pub const SENTINEL_END: &str = "---END---";

/// Case-insensitive stderr markers of an expired agent session
pub const AUTH_MARKERS: &[&str] =
    &["unauthorized", "authentication", "not logged in", "please login", "401"];

/// Characters of combined output quoted in failure messages
pub const EXCERPT_CHARS: usize = 500;

pub const UNPARSED_URL: &str = "Could not parse URL";
pub const UNPARSED_SUMMARY: &str = "Build completed but output format was unexpected. Check logs.";

#[allow(clippy::expect_used)]
static SENTINEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)---DEPLOYMENT_COMPLETE---\s*\n\s*URL:\s*(.+?)\s*\n\s*REPO:\s*(.+?)\s*\n\s*SUMMARY:\s*(.+?)\s*\n\s*---END---",
    )
    .expect("constant regex pattern is valid")
});

/// First auth marker contained in `chunk`, if any.
pub fn auth_marker(chunk: &str) -> Option<&'static str> {
    let lower = chunk.to_lowercase();
    AUTH_MARKERS.iter().copied().find(|marker| lower.contains(marker))
}

/// Fields of a fully parsed sentinel block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub url: String,
    pub repo: String,
    pub summary: String,
}

/// Parse the first complete sentinel block in `stdout`.
pub fn parse_sentinel(stdout: &str) -> Option<Deployment> {
    let caps = SENTINEL.captures(stdout)?;
    let field = |i: usize| caps.get(i).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
    Some(Deployment { url: field(1), repo: field(2), summary: field(3) })
}

/// Everything observed about one finished agent run.
#[derive(Debug, Clone, Copy)]
pub struct RunOutput<'a> {
    /// Exit code, `-1` when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub auth_suspected: bool,
}

/// Turns a finished run into exactly one [`Outcome`].
#[derive(Debug, Clone)]
pub struct OutcomeClassifier {
    /// Repository reported when the sentinel start marker is present but unparseable
    fallback_repo: String,
    log_path: Option<PathBuf>,
}

impl OutcomeClassifier {
    pub fn new(fallback_repo: impl Into<String>, log_path: Option<PathBuf>) -> Self {
        Self { fallback_repo: fallback_repo.into(), log_path }
    }

    pub fn classify(&self, run: &RunOutput<'_>) -> Outcome {
        if run.auth_suspected {
            return Outcome::AuthExpired;
        }

        if let Some(Deployment { url, repo, summary }) = parse_sentinel(run.stdout) {
            return Outcome::Success { url, repo, summary };
        }

        // A start marker without a parseable block still counts as a deploy.
        if run.stdout.contains(SENTINEL_START) {
            tracing::warn!(repo = %self.fallback_repo, "sentinel block present but malformed");
            return Outcome::Success {
                url: UNPARSED_URL.to_string(),
                repo: self.fallback_repo.clone(),
                summary: UNPARSED_SUMMARY.to_string(),
            };
        }

        let mut message = format!("Build did not complete (exit code {})", run.exit_code);
        let excerpt = excerpt(run.stdout, run.stderr, EXCERPT_CHARS);
        if !excerpt.is_empty() {
            message.push_str("\n\n");
            message.push_str(&excerpt);
        }
        Outcome::Failure { message, log_path: self.log_path.clone() }
    }
}

/// Last `max_chars` characters of stdout followed by stderr, trimmed.
fn excerpt(stdout: &str, stderr: &str, max_chars: usize) -> String {
    let combined = if stderr.is_empty() {
        stdout.to_string()
    } else {
        format!("{}\n{}", stdout, stderr)
    };
    let combined = combined.trim();
    let total = combined.chars().count();
    combined.chars().skip(total.saturating_sub(max_chars)).collect()
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
