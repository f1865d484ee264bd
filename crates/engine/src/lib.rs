// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-engine: the job queue and the agent process supervisor

mod cache;
mod classify;
mod error;
mod instructions;
mod job_log;
mod log_paths;
mod progress;
mod queue;
mod runner;
mod supervisor;

pub use cache::{LastOutcome, LastOutcomeCache};
pub use classify::{
    auth_marker, parse_sentinel, Deployment, OutcomeClassifier, RunOutput, AUTH_MARKERS,
    SENTINEL_END, SENTINEL_START,
};
pub use error::RunError;
pub use instructions::compose_instructions;
pub use job_log::{read_tail, JobLog, LOG_TAIL_CHARS};
pub use log_paths::{job_log_path, log_timestamp};
pub use progress::{
    default_rules, ProgressParser, ProgressRule, ProgressUpdate, DEFAULT_PROGRESS_INTERVAL,
};
pub use queue::{outcome_event, CancelledJob, JobQueue, QueueConfig, DEFAULT_CANCEL_GRACE};
pub use runner::JobRunner;
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeResult, FakeRunner};
pub use supervisor::{
    ProcessSupervisor, SupervisorConfig, DEFAULT_AGENT_ARGS, DEFAULT_DEADLINE, DEFAULT_ENV_ALLOW,
};
