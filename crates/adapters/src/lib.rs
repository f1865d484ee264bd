// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Boundary adapters: the agent process launcher and notification sinks.

pub mod agent;
pub mod notify;

pub use agent::{prepare_workspace, terminate, AgentError, AgentLaunch, ExecIdentity};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeSink;
pub use notify::{
    progress_bar, DesktopSink, DetachedSink, FanoutSink, LogSink, NotifyError, NotifyEvent, NotifySink,
};
