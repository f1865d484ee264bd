// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress inference from unstructured agent output.
//!
//! Rules are matched against the whole stdout seen so far, not the latest
//! chunk. At most one update is emitted per interval; when several rules
//! become eligible inside one interval only the highest is reported and
//! the lower ones are dropped, so observers can see jumps (25% -> 70%).
//! The percentage never goes down.

use forge_core::Clock;
use regex::{Regex, RegexBuilder};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// One row of the progress table.
#[derive(Debug, Clone)]
pub struct ProgressRule {
    pattern: Regex,
    pub status: String,
    pub percentage: u8,
}

impl ProgressRule {
    /// Compile a case-insensitive rule.
    pub fn new(
        pattern: &str,
        status: impl Into<String>,
        percentage: u8,
    ) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern, status: status.into(), percentage })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

const DEFAULT_TABLE: &[(&str, &str, u8)] = &[
    (r"creating|initializing|mkdir", "Creating project structure...", 10),
    (r"npm install|installing|dependencies", "Installing dependencies...", 25),
    (r"writing|creating.*component|creating.*file", "Writing components...", 40),
    (r"styling|tailwind|css", "Applying styles...", 55),
    (r"building|vite|webpack|compile", "Building application...", 70),
    (r"git init|git add|committing", "Committing to git...", 80),
    (r"pushing|git push|gh repo", "Pushing to GitHub...", 90),
    (r"pages|deploying|deployment", "Deploying to GitHub Pages...", 95),
];

#[allow(clippy::expect_used)]
static DEFAULT_RULES: LazyLock<Arc<[ProgressRule]>> = LazyLock::new(|| {
    DEFAULT_TABLE
        .iter()
        .map(|(pattern, status, pct)| {
            ProgressRule::new(pattern, *status, *pct).expect("constant regex pattern is valid")
        })
        .collect()
});

/// The built-in table for web-app builds.
pub fn default_rules() -> Arc<[ProgressRule]> {
    Arc::clone(&DEFAULT_RULES)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub status: String,
    pub percentage: u8,
}

/// Per-job progress state.
pub struct ProgressParser<C: Clock> {
    rules: Arc<[ProgressRule]>,
    clock: C,
    interval: Duration,
    last_emit: Instant,
    highest: u8,
}

impl<C: Clock> ProgressParser<C> {
    /// The first interval starts now, so nothing is emitted before it elapses.
    pub fn new(rules: Arc<[ProgressRule]>, clock: C, interval: Duration) -> Self {
        let last_emit = clock.now();
        Self { rules, clock, interval, last_emit, highest: 0 }
    }

    /// Highest percentage emitted so far
    pub fn percentage(&self) -> u8 {
        self.highest
    }

    /// Feed the cumulative stdout text; returns an update when one is due.
    pub fn on_chunk(&mut self, cumulative: &str) -> Option<ProgressUpdate> {
        if self.clock.since(self.last_emit) < self.interval {
            return None;
        }
        // Highest eligible rule wins; ties go to the earlier row.
        let best = self
            .rules
            .iter()
            .filter(|rule| rule.percentage > self.highest && rule.matches(cumulative))
            .reduce(|best, rule| if rule.percentage > best.percentage { rule } else { best })?;

        self.highest = best.percentage;
        self.last_emit = self.clock.now();
        Some(ProgressUpdate { status: best.status.clone(), percentage: best.percentage })
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
