// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification sinks for job events.
//!
//! The engine hands every event for a job to the sink supplied with the
//! job. Rendering and transport belong to the sink; the engine only
//! logs delivery failures.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Events a job reports to its submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    /// Admitted behind a running job
    Queued { position: usize, current_app: String },
    Progress { status: String, percentage: u8 },
    Success { url: String, repo: String, summary: String },
    Failure { message: String, log_path: Option<PathBuf> },
    AuthExpired,
}

impl NotifyEvent {
    pub fn title(&self, app: &str) -> String {
        match self {
            NotifyEvent::Queued { .. } => format!("Queued: {}", app),
            NotifyEvent::Progress { .. } => format!("Forging: {}", app),
            NotifyEvent::Success { .. } => format!("{} is live!", app),
            NotifyEvent::Failure { .. } => format!("Build failed: {}", app),
            NotifyEvent::AuthExpired => "Authentication required".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            NotifyEvent::Queued { position, current_app } => {
                format!("#{} in queue. Current build: {}", position, current_app)
            }
            NotifyEvent::Progress { status, percentage } => {
                format!("{} {} {}%", status, progress_bar(*percentage), percentage)
            }
            NotifyEvent::Success { url, repo, summary } => {
                format!("{}\nLive: {}\nRepo: {}", summary, url, repo)
            }
            NotifyEvent::Failure { message, log_path: Some(path) } => {
                format!("{}\nLogs: {}", message, path.display())
            }
            NotifyEvent::Failure { message, log_path: None } => message.clone(),
            NotifyEvent::AuthExpired => {
                "The agent session has expired. Re-authenticate, then retry the build.".to_string()
            }
        }
    }
}

/// Twenty-cell bar, one `#` per 5%.
pub fn progress_bar(percentage: u8) -> String {
    let filled = ((percentage.min(100) as usize) + 2) / 5;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}

/// Receiver of job events
#[async_trait]
pub trait NotifySink: Send + Sync + 'static {
    async fn notify(&self, app: &str, event: &NotifyEvent) -> Result<(), NotifyError>;
}

/// Writes events to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotifySink for LogSink {
    async fn notify(&self, app: &str, event: &NotifyEvent) -> Result<(), NotifyError> {
        match event {
            NotifyEvent::Failure { .. } | NotifyEvent::AuthExpired => {
                tracing::warn!(app, title = %event.title(app), body = %event.body(), "job notification");
            }
            _ => {
                tracing::info!(app, title = %event.title(app), body = %event.body(), "job notification");
            }
        }
        Ok(())
    }
}

/// Desktop notification sink using notify-rust.
///
/// Progress ticks are skipped; everything else pops a notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopSink;

impl DesktopSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifySink for DesktopSink {
    async fn notify(&self, app: &str, event: &NotifyEvent) -> Result<(), NotifyError> {
        if matches!(event, NotifyEvent::Progress { .. }) {
            return Ok(());
        }
        let title = event.title(app);
        let body = event.body();
        // Notification::show() blocks on some platforms; keep it off the runtime threads.
        tokio::task::spawn_blocking(move || {
            match notify_rust::Notification::new().summary(&title).body(&body).show() {
                Ok(_) => tracing::debug!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}

/// Delivers each event to every inner sink, even when an earlier one fails.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotifySink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn NotifySink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl NotifySink for FanoutSink {
    async fn notify(&self, app: &str, event: &NotifyEvent) -> Result<(), NotifyError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.notify(app, event).await {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Hands events to a background task that delivers them in order.
///
/// Senders never wait on the inner sink. The task ends once every clone of
/// this sink has been dropped and the backlog is delivered.
#[derive(Clone)]
pub struct DetachedSink {
    tx: mpsc::UnboundedSender<(String, NotifyEvent)>,
}

impl DetachedSink {
    /// Must be called from within a tokio runtime.
    pub fn spawn(inner: Arc<dyn NotifySink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, NotifyEvent)>();
        tokio::spawn(async move {
            while let Some((app, event)) = rx.recv().await {
                if let Err(e) = inner.notify(&app, &event).await {
                    tracing::warn!(%app, error = %e, "notification delivery failed");
                }
            }
        });
        Self { tx }
    }

    pub fn send(&self, app: &str, event: NotifyEvent) {
        if self.tx.send((app.to_string(), event)).is_err() {
            tracing::debug!(app, "notification dropped, delivery task gone");
        }
    }
}

#[async_trait]
impl NotifySink for DetachedSink {
    async fn notify(&self, app: &str, event: &NotifyEvent) -> Result<(), NotifyError> {
        self.send(app, event.clone());
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{NotifyError, NotifyEvent, NotifySink};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeSinkState {
        events: Vec<(String, NotifyEvent)>,
        fail: bool,
    }

    /// Recording sink for tests
    #[derive(Clone, Default)]
    pub struct FakeSink {
        inner: Arc<Mutex<FakeSinkState>>,
    }

    impl FakeSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// A sink that records events and then reports every delivery as failed
        pub fn failing() -> Self {
            let sink = Self::default();
            sink.inner.lock().fail = true;
            sink
        }

        /// All recorded `(app, event)` pairs in delivery order
        pub fn events(&self) -> Vec<(String, NotifyEvent)> {
            self.inner.lock().events.clone()
        }

        /// Percentages of recorded progress events in delivery order
        pub fn progress(&self) -> Vec<u8> {
            self.inner
                .lock()
                .events
                .iter()
                .filter_map(|(_, e)| match e {
                    NotifyEvent::Progress { percentage, .. } => Some(*percentage),
                    _ => None,
                })
                .collect()
        }

        /// Recorded events other than progress ticks
        pub fn terminal(&self) -> Vec<NotifyEvent> {
            self.inner
                .lock()
                .events
                .iter()
                .filter(|(_, e)| {
                    !matches!(e, NotifyEvent::Progress { .. } | NotifyEvent::Queued { .. })
                })
                .map(|(_, e)| e.clone())
                .collect()
        }
    }

    #[async_trait]
    impl NotifySink for FakeSink {
        async fn notify(&self, app: &str, event: &NotifyEvent) -> Result<(), NotifyError> {
            let mut inner = self.inner.lock();
            inner.events.push((app.to_string(), event.clone()));
            if inner.fail {
                return Err(NotifyError::SendFailed("fake sink configured to fail".to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSink;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
