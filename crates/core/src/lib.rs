// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-core: data model for the forge build queue

pub mod macros;

pub mod build_config;
pub mod clock;
pub mod id;
pub mod job;
pub mod outcome;
pub mod snapshot;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(any(test, feature = "test-support"))]
pub use build_config::BuildConfigBuilder;
pub use build_config::{
    parse_features, parse_tech_stack, slugify, Account, BuildConfig, DEFAULT_DESIGN, DEFAULT_TECH_STACK,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{IdGen, JobId, SequentialIdGen};
pub use job::{Job, JobStatus, TransitionError};
pub use outcome::Outcome;
pub use snapshot::{CurrentJob, QueueSnapshot, QueuedJob};
pub use time_fmt::format_elapsed;
