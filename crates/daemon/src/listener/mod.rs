// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Each connection carries one request and one response. Handlers only
//! touch the queue handle, which never waits on the running job.

mod jobs;

use std::sync::Arc;
use std::time::Instant;

use forge_adapters::NotifySink;
use forge_core::SystemClock;
use forge_engine::JobQueue;
use forge_wire::{self as wire, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::config::AccountBook;
use crate::env::ipc_timeout;

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub queue: JobQueue<SystemClock>,
    pub accounts: Arc<AccountBook>,
    /// Where submitted jobs report progress and outcomes
    pub sink: Arc<dyn NotifySink>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Accept connections forever, one task per connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("Unix accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("Client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let request = wire::read_request(&mut reader, ipc_timeout()).await?;

    // Status polls arrive constantly; keep them out of the info log
    if request.is_poll() {
        debug!(request = ?request, "received poll");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx).await;
    wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

pub(crate) async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong { uptime_secs: ctx.start_time.elapsed().as_secs() },

        Request::Status => Response::Status { snapshot: ctx.queue.status() },

        Request::Submit { account, app_name, description, tech_stack, design, features } => {
            jobs::submit(ctx, jobs::SubmitForm {
                account,
                app_name,
                description,
                tech_stack,
                design,
                features,
            })
        }

        Request::Cancel => jobs::cancel(ctx),

        Request::Retry => jobs::retry(ctx),

        Request::LastLog => jobs::last_log(ctx).await,

        Request::Shutdown => {
            info!("shutdown requested over socket");
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
