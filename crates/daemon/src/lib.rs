// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-daemon: configuration, startup, and the control socket of `forged`

pub mod client;
pub mod config;
pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod logging;

pub use client::{ClientError, DaemonClient};
pub use config::{AccountBook, ConfigError, ForgeConfig};
pub use lifecycle::{startup, Config, DaemonState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
