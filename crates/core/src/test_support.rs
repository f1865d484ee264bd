// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::build_config::Account;

/// Account fixture whose identity name is `<key>-user` and token `tok-<key>`.
pub fn account(key: &str) -> Account {
    Account {
        key: key.to_string(),
        name: format!("{}-user", key),
        label: key.to_string(),
        token: format!("tok-{}", key),
        color: 0x238636,
    }
}

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::job::JobStatus;
    use proptest::prelude::*;

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Queued),
            Just(JobStatus::Running),
            Just(JobStatus::Cancelled),
            Just(JobStatus::Completed),
        ]
    }
}
