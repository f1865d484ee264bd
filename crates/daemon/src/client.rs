// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client side of the control socket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_wire::{self as wire, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::env::ipc_timeout;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot connect to daemon at {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Sends one request per connection, matching the listener.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into(), timeout: ipc_timeout() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect { path: self.socket_path.clone(), source })?;
        let (mut reader, mut writer) = stream.into_split();
        wire::write_request(&mut writer, request, self.timeout).await?;
        Ok(wire::read_response(&mut reader, self.timeout).await?)
    }
}
