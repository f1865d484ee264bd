// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the queue and whatever actually runs a job.

use crate::error::RunError;
use async_trait::async_trait;
use forge_adapters::NotifySink;
use forge_core::{Job, Outcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs one job to completion.
///
/// `cancel` fires when the queue has already settled the job as cancelled;
/// the runner should stop the work and return promptly. Whatever it returns
/// afterwards is discarded.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    async fn run(
        &self,
        job: &Job,
        sink: Arc<dyn NotifySink>,
        cancel: CancellationToken,
    ) -> Result<Outcome, RunError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::JobRunner;
    use crate::error::RunError;
    use async_trait::async_trait;
    use forge_adapters::NotifySink;
    use forge_core::{Job, JobId, Outcome};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::oneshot;
    use tokio_util::sync::CancellationToken;

    /// How a fake run ends
    pub enum FakeResult {
        Outcome(Outcome),
        Error(RunError),
        Panic,
    }

    #[derive(Default)]
    struct FakeRunnerState {
        started: Vec<JobId>,
        cancelled: Vec<JobId>,
        pending: HashMap<JobId, oneshot::Sender<FakeResult>>,
    }

    /// Runner whose jobs stay running until the test resolves them.
    #[derive(Clone, Default)]
    pub struct FakeRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Jobs handed to `run`, in start order
        pub fn started(&self) -> Vec<JobId> {
            self.inner.lock().started.clone()
        }

        /// Jobs whose cancel token fired while running
        pub fn cancelled(&self) -> Vec<JobId> {
            self.inner.lock().cancelled.clone()
        }

        /// Jobs currently inside `run`
        pub fn running(&self) -> usize {
            self.inner.lock().pending.len()
        }

        /// Resolve a running job. Returns false if it is not running.
        pub fn finish(&self, id: JobId, result: FakeResult) -> bool {
            match self.inner.lock().pending.remove(&id) {
                Some(tx) => tx.send(result).is_ok(),
                None => false,
            }
        }

        pub fn complete(&self, id: JobId, outcome: Outcome) -> bool {
            self.finish(id, FakeResult::Outcome(outcome))
        }
    }

    #[async_trait]
    impl JobRunner for FakeRunner {
        #[allow(clippy::panic)]
        async fn run(
            &self,
            job: &Job,
            _sink: Arc<dyn NotifySink>,
            cancel: CancellationToken,
        ) -> Result<Outcome, RunError> {
            let (tx, rx) = oneshot::channel();
            {
                let mut inner = self.inner.lock();
                inner.started.push(job.id);
                inner.pending.insert(job.id, tx);
            }
            tokio::select! {
                result = rx => match result {
                    Ok(FakeResult::Outcome(outcome)) => Ok(outcome),
                    Ok(FakeResult::Error(e)) => Err(e),
                    Ok(FakeResult::Panic) => panic!("fake runner panicked for {}", job.id),
                    Err(_) => Ok(Outcome::Cancelled),
                },
                () = cancel.cancelled() => {
                    let mut inner = self.inner.lock();
                    inner.pending.remove(&job.id);
                    inner.cancelled.push(job.id);
                    Ok(Outcome::Cancelled)
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResult, FakeRunner};
