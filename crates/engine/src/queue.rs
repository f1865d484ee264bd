// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-slot FIFO job queue.
//!
//! At most one job runs at a time. Jobs are admitted in submission order;
//! a finished job frees the slot immediately, a cancelled one after a
//! short grace delay so the stopped agent can release its workspace.
//!
//! Settlement is one-shot per job: whichever of cancel and natural exit
//! claims the job first decides its outcome, and the other is dropped.

use crate::cache::{LastOutcome, LastOutcomeCache};
use crate::log_paths::job_log_path;
use crate::runner::JobRunner;
use forge_adapters::{DetachedSink, NotifyEvent, NotifySink};
use forge_core::{
    format_elapsed, BuildConfig, Clock, CurrentJob, IdGen, Job, JobId, JobStatus, Outcome,
    QueueSnapshot, QueuedJob, SequentialIdGen,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause between a cancel and the next promotion.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Directory for per-job log artifacts
    pub log_dir: PathBuf,
    pub cancel_grace: Duration,
}

impl QueueConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self { log_dir: log_dir.into(), cancel_grace: DEFAULT_CANCEL_GRACE }
    }

    forge_core::setters! {
        set {
            cancel_grace: Duration,
        }
    }
}

/// What `cancel()` stopped.
#[derive(Debug, Clone)]
pub struct CancelledJob {
    pub job_id: JobId,
    pub config: Arc<BuildConfig>,
    pub runtime: Duration,
}

/// One-shot claim on a running job's outcome.
#[derive(Debug, Default)]
struct SettleGuard(AtomicBool);

impl SettleGuard {
    /// True for exactly one caller.
    fn claim(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

struct Waiting {
    job: Job,
    sink: DetachedSink,
}

struct Active {
    job: Job,
    sink: DetachedSink,
    cancel: CancellationToken,
    settle: Arc<SettleGuard>,
}

#[derive(Default)]
struct QueueState {
    waiting: VecDeque<Waiting>,
    active: Option<Active>,
    /// Set between a cancel and the end of its grace delay
    cooling: bool,
}

struct Inner<C: Clock> {
    runner: Arc<dyn JobRunner>,
    cache: Arc<LastOutcomeCache>,
    ids: SequentialIdGen,
    clock: C,
    config: QueueConfig,
    state: Mutex<QueueState>,
}

/// Cloneable handle to the queue. All operations return without waiting
/// on the running job; they must be called inside a tokio runtime.
pub struct JobQueue<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for JobQueue<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Clock> JobQueue<C> {
    pub fn new(runner: Arc<dyn JobRunner>, config: QueueConfig, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                runner,
                cache: Arc::new(LastOutcomeCache::new()),
                ids: SequentialIdGen::new(),
                clock,
                config,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Submit a build. Runs immediately when the slot is free; otherwise the
    /// sink is told its position and the currently running app.
    pub fn add(&self, config: BuildConfig, sink: Arc<dyn NotifySink>) -> JobId {
        let id = self.inner.ids.next();
        let job = Job::new(id, Arc::new(config), self.inner.clock.now());
        let app = job.config.app_name.clone();
        let sink = DetachedSink::spawn(sink);
        {
            let mut state = self.inner.state.lock();
            if let Some(active) = &state.active {
                let position = state.waiting.len() + 1;
                let current_app = active.job.config.app_name.clone();
                tracing::info!(job_id = %id, %app, position, %current_app, "job queued");
                sink.send(&app, NotifyEvent::Queued { position, current_app });
            } else {
                tracing::info!(job_id = %id, %app, "job accepted");
            }
            state.waiting.push_back(Waiting { job, sink });
        }
        self.promote_next();
        id
    }

    /// Stop the running job, if any.
    ///
    /// The job is settled as cancelled before this returns; the agent is
    /// signalled and the next job waits out the grace delay. Returns `None`
    /// when nothing is running or the running job has already finished.
    pub fn cancel(&self) -> Option<CancelledJob> {
        let (cancelled, grace) = {
            let mut state = self.inner.state.lock();
            if !state.active.as_ref().is_some_and(|a| a.settle.claim()) {
                return None;
            }
            let mut active = state.active.take()?;
            if let Err(e) = active.job.transition(JobStatus::Cancelled) {
                tracing::error!(job_id = %active.job.id, error = %e, "cancel of non-running job");
            }
            active.cancel.cancel();
            state.cooling = true;

            let runtime = active
                .job
                .started_at
                .map(|t| self.inner.clock.since(t))
                .unwrap_or_default();
            self.record(&active.job, Outcome::Cancelled);
            tracing::info!(
                job_id = %active.job.id,
                app = %active.job.config.app_name,
                runtime = %format_elapsed(runtime),
                "job cancelled"
            );
            (
                CancelledJob { job_id: active.job.id, config: Arc::clone(&active.job.config), runtime },
                self.inner.config.cancel_grace,
            )
        };

        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            queue.inner.state.lock().cooling = false;
            queue.promote_next();
        });
        Some(cancelled)
    }

    /// Current job and waiting jobs in admission order.
    pub fn status(&self) -> QueueSnapshot {
        let clock = &self.inner.clock;
        let state = self.inner.state.lock();
        let current = state.active.as_ref().map(|a| CurrentJob {
            job_id: a.job.id,
            app_name: a.job.config.app_name.clone(),
            account_name: a.job.config.account.name.clone(),
            elapsed_ms: a.job.started_at.map(|t| clock.since(t).as_millis() as u64).unwrap_or(0),
        });
        let ahead = usize::from(state.active.is_some());
        let queued = state
            .waiting
            .iter()
            .enumerate()
            .map(|(i, w)| QueuedJob {
                position: i + ahead,
                job_id: w.job.id,
                app_name: w.job.config.app_name.clone(),
                account_name: w.job.config.account.name.clone(),
                waiting_ms: clock.since(w.job.added_at).as_millis() as u64,
            })
            .collect();
        QueueSnapshot { current, queued }
    }

    /// Resubmit the most recently finished build.
    pub fn retry_last(&self, sink: Arc<dyn NotifySink>) -> Option<JobId> {
        let last = self.inner.cache.get()?;
        tracing::info!(app = %last.config.app_name, previous = %last.job_id, "retrying last build");
        Some(self.add((*last.config).clone(), sink))
    }

    pub fn last_outcome(&self) -> Option<LastOutcome> {
        self.inner.cache.get()
    }

    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock();
        state.active.is_none() && state.waiting.is_empty()
    }

    fn promote_next(&self) {
        let mut state = self.inner.state.lock();
        if state.active.is_some() || state.cooling {
            return;
        }
        let Some(Waiting { mut job, sink }) = state.waiting.pop_front() else {
            return;
        };

        let clock = &self.inner.clock;
        let log_path = job_log_path(&self.inner.config.log_dir, clock.epoch_ms(), &job.config.slug);
        if let Err(e) = job.start(clock.now(), log_path) {
            // Only queued jobs sit in `waiting`; a failure here is a bug.
            tracing::error!(job_id = %job.id, error = %e, "failed to promote job");
            drop(state);
            self.promote_next();
            return;
        }
        let cancel = CancellationToken::new();
        let settle = Arc::new(SettleGuard::default());
        state.active = Some(Active {
            job: job.clone(),
            sink: sink.clone(),
            cancel: cancel.clone(),
            settle: Arc::clone(&settle),
        });
        drop(state);

        tracing::info!(
            job_id = %job.id,
            app = %job.config.app_name,
            account = %job.config.account.key,
            log = ?job.log_path,
            "job started"
        );

        let queue = self.clone();
        tokio::spawn(async move {
            let runner = Arc::clone(&queue.inner.runner);
            let run_job = job.clone();
            let run_sink: Arc<dyn NotifySink> = Arc::new(sink);
            // Inner task so a panicking runner still settles the job.
            let handle = tokio::spawn(async move { runner.run(&run_job, run_sink, cancel).await });
            let outcome = match handle.await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    tracing::error!(job_id = %job.id, error = %e, "job failed to run");
                    Outcome::Failure { message: format!("Build error: {}", e), log_path: job.log_path.clone() }
                }
                Err(e) => {
                    tracing::error!(job_id = %job.id, error = %e, "job runner crashed");
                    Outcome::Failure {
                        message: "Build error: runner crashed".to_string(),
                        log_path: job.log_path.clone(),
                    }
                }
            };
            queue.finish(job.id, &settle, outcome);
        });
    }

    /// Settle a job whose run returned. No-op if cancel got there first.
    fn finish(&self, id: JobId, settle: &SettleGuard, outcome: Outcome) {
        if !settle.claim() {
            tracing::debug!(job_id = %id, %outcome, "run ended after cancel, outcome discarded");
            return;
        }
        let active = {
            let mut state = self.inner.state.lock();
            match state.active.take_if(|a| a.job.id == id) {
                Some(active) => active,
                None => {
                    tracing::error!(job_id = %id, "finished job is not the active job");
                    return;
                }
            }
        };
        let Active { mut job, sink, .. } = active;
        if let Err(e) = job.transition(JobStatus::Completed) {
            tracing::error!(job_id = %id, error = %e, "invalid completion");
        }
        let runtime = job.started_at.map(|t| self.inner.clock.since(t)).unwrap_or_default();
        tracing::info!(
            job_id = %id,
            app = %job.config.app_name,
            %outcome,
            runtime = %format_elapsed(runtime),
            "job finished"
        );

        if let Some(event) = outcome_event(&outcome) {
            sink.send(&job.config.app_name, event);
        }
        self.record(&job, outcome);
        self.promote_next();
    }

    fn record(&self, job: &Job, outcome: Outcome) {
        self.inner.cache.set(LastOutcome {
            job_id: job.id,
            config: Arc::clone(&job.config),
            outcome,
            log_path: job.log_path.clone(),
            completed_at_ms: self.inner.clock.epoch_ms(),
        });
    }
}

/// The notification a settled outcome produces. Cancellation is reported by
/// whoever cancelled, not through the job's sink.
pub fn outcome_event(outcome: &Outcome) -> Option<NotifyEvent> {
    match outcome {
        Outcome::Success { url, repo, summary } => Some(NotifyEvent::Success {
            url: url.clone(),
            repo: repo.clone(),
            summary: summary.clone(),
        }),
        Outcome::AuthExpired => Some(NotifyEvent::AuthExpired),
        Outcome::Failure { message, log_path } => {
            Some(NotifyEvent::Failure { message: message.clone(), log_path: log_path.clone() })
        }
        Outcome::TimedOut { after_ms, log_path } => Some(NotifyEvent::Failure {
            message: format!(
                "Build timed out after {}",
                format_elapsed(Duration::from_millis(*after_ms))
            ),
            log_path: log_path.clone(),
        }),
        Outcome::Cancelled => None,
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
