// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one job as an agent process.
//!
//! The supervisor writes the instruction document to the agent's stdin,
//! tees both output streams into the job log, turns stdout into progress
//! ticks, watches stderr for credential expiry, and enforces the per-job
//! deadline. When the process ends the collected output is classified.

use crate::classify::{auth_marker, OutcomeClassifier, RunOutput};
use crate::error::RunError;
use crate::instructions::compose_instructions;
use crate::job_log::JobLog;
use crate::progress::{default_rules, ProgressParser, ProgressRule, DEFAULT_PROGRESS_INTERVAL};
use crate::runner::JobRunner;
use async_trait::async_trait;
use forge_adapters::{prepare_workspace, terminate, AgentLaunch, ExecIdentity, NotifyEvent, NotifySink};
use forge_core::{format_elapsed, Clock, Job, Outcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Per-job wall-clock limit.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30 * 60);

/// Arguments for a non-interactive agent run that needs no permission prompts.
pub const DEFAULT_AGENT_ARGS: &[&str] = &["--print", "--dangerously-skip-permissions"];

/// Orchestrator variables the agent inherits by default.
pub const DEFAULT_ENV_ALLOW: &[&str] = &["PATH", "LANG", "LC_ALL", "TZ", "TERM"];

/// How long output is still collected once the agent has exited.
const DRAIN_AFTER_EXIT: Duration = Duration::from_secs(2);

const READ_BUF: usize = 8192;

/// How agent processes are launched and bounded.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Agents run in `<workspace_root>/<account key>`
    pub workspace_root: PathBuf,
    pub env_allow: Vec<String>,
    pub identity: Option<ExecIdentity>,
    pub deadline: Duration,
    pub progress_interval: Duration,
    pub progress_rules: Arc<[ProgressRule]>,
}

impl SupervisorConfig {
    pub fn new(program: impl Into<String>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: DEFAULT_AGENT_ARGS.iter().map(|s| s.to_string()).collect(),
            workspace_root: workspace_root.into(),
            env_allow: DEFAULT_ENV_ALLOW.iter().map(|s| s.to_string()).collect(),
            identity: None,
            deadline: DEFAULT_DEADLINE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress_rules: default_rules(),
        }
    }

    forge_core::setters! {
        set {
            args: Vec<String>,
            env_allow: Vec<String>,
            deadline: Duration,
            progress_interval: Duration,
            progress_rules: Arc<[ProgressRule]>,
        }
        option {
            identity: ExecIdentity,
        }
    }
}

/// [`JobRunner`] backed by a real agent process.
#[derive(Clone)]
pub struct ProcessSupervisor<C: Clock> {
    config: Arc<SupervisorConfig>,
    clock: C,
}

impl<C: Clock> ProcessSupervisor<C> {
    pub fn new(config: SupervisorConfig, clock: C) -> Self {
        Self { config: Arc::new(config), clock }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }
}

enum Chunk {
    Stdout(String),
    Stderr(String),
}

/// Output seen so far for one run.
struct Collected<C: Clock> {
    stdout: String,
    stderr: String,
    auth_suspected: bool,
    progress: ProgressParser<C>,
}

#[async_trait]
impl<C: Clock> JobRunner for ProcessSupervisor<C> {
    async fn run(
        &self,
        job: &Job,
        sink: Arc<dyn NotifySink>,
        cancel: CancellationToken,
    ) -> Result<Outcome, RunError> {
        let log_path = job.log_path.clone().ok_or(RunError::NotStarted(job.id))?;
        let build = &job.config;
        let app = build.app_name.as_str();

        let workdir = self.config.workspace_root.join(&build.account.key);
        prepare_workspace(&workdir, self.config.identity.as_ref()).await?;
        let document = compose_instructions(build, &workdir.join(&build.slug));

        let mut launch = AgentLaunch::new(&self.config.program, &workdir)
            .args(self.config.args.clone())
            .inherit_env(&self.config.env_allow)
            .env("GITHUB_TOKEN", &build.account.token)
            .env("GH_TOKEN", &build.account.token);
        launch.identity = self.config.identity.clone();

        let mut log = JobLog::open(log_path.clone()).await;
        let mut child = match launch.spawn() {
            Ok(child) => child,
            Err(e) => {
                log.marker("SPAWN", &e.to_string()).await;
                log.close().await;
                return Err(e.into());
            }
        };
        let pid = child.id();
        tracing::info!(job_id = %job.id, app, pid, log = %log_path.display(), "agent started");

        if let Some(mut stdin) = child.stdin.take() {
            let job_id = job.id;
            tokio::spawn(async move {
                // Dropping stdin afterwards closes it so the agent sees EOF.
                if let Err(e) = stdin.write_all(document.as_bytes()).await {
                    tracing::debug!(%job_id, error = %e, "agent stdin closed early");
                }
            });
        }

        let (tx, mut rx) = mpsc::channel::<Chunk>(64);
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump(stdout, Chunk::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump(stderr, Chunk::Stderr, tx.clone()));
        }
        drop(tx);

        let mut seen = Collected {
            stdout: String::new(),
            stderr: String::new(),
            auth_suspected: false,
            progress: ProgressParser::new(
                Arc::clone(&self.config.progress_rules),
                self.clock.clone(),
                self.config.progress_interval,
            ),
        };

        let deadline = tokio::time::sleep(self.config.deadline);
        tokio::pin!(deadline);
        // Armed on exit; a descendant holding the pipes must not stall the run.
        let drain = tokio::time::sleep(self.config.deadline);
        tokio::pin!(drain);
        let mut streams_open = true;
        let mut exit = None;
        let mut terminate_sent = false;

        // Exit and end-of-output can arrive in either order; wait for both.
        let status = loop {
            if let (false, Some(status)) = (streams_open, exit) {
                break status;
            }
            tokio::select! {
                chunk = rx.recv(), if streams_open => match chunk {
                    Some(chunk) => ingest(chunk, &mut seen, &mut log, job, &sink).await,
                    None => streams_open = false,
                },
                status = child.wait(), if exit.is_none() => {
                    exit = Some(status.map_err(RunError::Wait)?);
                    drain.as_mut().reset(tokio::time::Instant::now() + DRAIN_AFTER_EXIT);
                }
                () = &mut drain, if exit.is_some() && streams_open => {
                    tracing::debug!(job_id = %job.id, "agent output still open after exit, detaching");
                    streams_open = false;
                }
                () = cancel.cancelled(), if !terminate_sent && exit.is_none() => {
                    terminate_sent = true;
                    tracing::info!(job_id = %job.id, app, pid, "terminating agent");
                    if let Some(pid) = pid {
                        if let Err(e) = terminate(pid) {
                            tracing::warn!(job_id = %job.id, error = %e, "failed to signal agent");
                        }
                    }
                    log.marker("CANCEL", "termination requested").await;
                }
                // After exit only the drain timer bounds the wait.
                () = &mut deadline, if exit.is_none() => {
                    let limit = format_elapsed(self.config.deadline);
                    tracing::warn!(job_id = %job.id, app, %limit, "agent exceeded deadline, killing");
                    if let Err(e) = child.kill().await {
                        tracing::warn!(job_id = %job.id, error = %e, "failed to kill agent");
                    }
                    log.marker("TIMEOUT", &format!("killed after {}", limit)).await;
                    log.close().await;
                    return Ok(Outcome::TimedOut {
                        after_ms: self.config.deadline.as_millis() as u64,
                        log_path: Some(log_path),
                    });
                }
            }
        };

        let exit_code = status.code().unwrap_or(-1);
        log.marker("EXIT", &format!("code {}", exit_code)).await;
        log.close().await;

        if cancel.is_cancelled() {
            tracing::info!(job_id = %job.id, app, exit_code, "agent stopped after cancel");
            return Ok(Outcome::Cancelled);
        }

        let outcome = OutcomeClassifier::new(build.repo_url(), Some(log_path)).classify(&RunOutput {
            exit_code,
            stdout: &seen.stdout,
            stderr: &seen.stderr,
            auth_suspected: seen.auth_suspected,
        });
        tracing::info!(job_id = %job.id, app, exit_code, %outcome, "agent finished");
        Ok(outcome)
    }
}

async fn ingest<C: Clock>(
    chunk: Chunk,
    seen: &mut Collected<C>,
    log: &mut JobLog,
    job: &Job,
    sink: &Arc<dyn NotifySink>,
) {
    match chunk {
        Chunk::Stdout(text) => {
            log.stdout(&text).await;
            seen.stdout.push_str(&text);
            if let Some(update) = seen.progress.on_chunk(&seen.stdout) {
                tracing::debug!(job_id = %job.id, status = %update.status, percentage = update.percentage, "progress");
                let event = NotifyEvent::Progress { status: update.status, percentage: update.percentage };
                if let Err(e) = sink.notify(&job.config.app_name, &event).await {
                    tracing::warn!(job_id = %job.id, error = %e, "progress notification failed");
                }
            }
        }
        Chunk::Stderr(text) => {
            log.stderr(&text).await;
            if !seen.auth_suspected {
                if let Some(marker) = auth_marker(&text) {
                    tracing::warn!(job_id = %job.id, marker, "credential failure reported by agent");
                    seen.auth_suspected = true;
                }
            }
            seen.stderr.push_str(&text);
        }
    }
}

/// Forward a stream as text chunks until EOF.
///
/// A multi-byte character split across reads is held back until the
/// rest of it arrives.
async fn pump<R>(mut reader: R, wrap: fn(String) -> Chunk, tx: mpsc::Sender<Chunk>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUF];
    let mut pending: Vec<u8> = Vec::new();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "agent stream read failed");
                break;
            }
        };
        pending.extend_from_slice(&buf[..n]);
        let text = take_text(&mut pending);
        if !text.is_empty() && tx.send(wrap(text)).await.is_err() {
            return;
        }
    }
    if !pending.is_empty() {
        let _ = tx.send(wrap(String::from_utf8_lossy(&pending).into_owned())).await;
    }
}

/// Drain the decodable prefix of `pending`, keeping an incomplete trailing sequence.
fn take_text(pending: &mut Vec<u8>) -> String {
    let mut start = 0;
    let keep = loop {
        match std::str::from_utf8(&pending[start..]) {
            Ok(_) => break 0,
            Err(e) => match e.error_len() {
                Some(len) => start += e.valid_up_to() + len,
                None => break pending.len() - start - e.valid_up_to(),
            },
        }
    };
    let rest = pending.split_off(pending.len() - keep);
    let text = String::from_utf8_lossy(pending).into_owned();
    *pending = rest;
    text
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
