// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::jobs::SubmitForm;
use super::*;
use crate::client::DaemonClient;
use crate::config::AccountBook;
use forge_adapters::FakeSink;
use forge_core::{Outcome, DEFAULT_DESIGN, DEFAULT_TECH_STACK};
use forge_engine::{FakeRunner, QueueConfig};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

struct Daemon {
    dir: TempDir,
    client: DaemonClient,
    runner: FakeRunner,
    ctx: Arc<ListenCtx>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn context(dir: &TempDir, runner: &FakeRunner) -> Arc<ListenCtx> {
    let queue = JobQueue::new(
        Arc::new(runner.clone()),
        QueueConfig::new(dir.path().join("logs")).cancel_grace(Duration::from_millis(50)),
        SystemClock,
    );
    let accounts: AccountBook = vec![forge_core::test_support::account("personal")].into_iter().collect();
    Arc::new(ListenCtx {
        queue,
        accounts: Arc::new(accounts),
        sink: Arc::new(FakeSink::new()),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    })
}

async fn start() -> Daemon {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new();
    let ctx = context(&dir, &runner);
    let socket = dir.path().join("daemon.sock");
    let unix = UnixListener::bind(&socket).unwrap();
    let task = tokio::spawn(Listener::new(unix, Arc::clone(&ctx)).run());
    let client = DaemonClient::new(socket).with_timeout(Duration::from_secs(2));
    Daemon { dir, client, runner, ctx, task }
}

impl Daemon {
    async fn send(&self, request: Request) -> Response {
        self.client.send(&request).await.unwrap()
    }

    async fn submit(&self, account: &str, app_name: &str) -> Response {
        self.send(submit_request(account, app_name)).await
    }
}

fn submit_request(account: &str, app_name: &str) -> Request {
    Request::Submit {
        account: account.to_string(),
        app_name: app_name.to_string(),
        description: "A small app".to_string(),
        tech_stack: String::new(),
        design: String::new(),
        features: String::new(),
    }
}

fn form(app_name: &str, tech_stack: &str, design: &str, features: &str) -> SubmitForm {
    SubmitForm {
        account: "personal".to_string(),
        app_name: app_name.to_string(),
        description: "  Track spending  ".to_string(),
        tech_stack: tech_stack.to_string(),
        design: design.to_string(),
        features: features.to_string(),
    }
}

/// Poll until `check` holds or two seconds pass.
async fn eventually(check: impl Fn() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn ping_reports_uptime() {
    let d = start().await;
    assert!(matches!(d.send(Request::Ping).await, Response::Pong { uptime_secs: 0 }));
}

#[tokio::test]
async fn submit_to_unknown_account_is_rejected() {
    let d = start().await;
    let response = d.submit("work", "Budget Buddy").await;
    assert_eq!(response, Response::Error { message: "unknown account 'work'".to_string() });
    assert!(d.ctx.queue.is_idle());
}

#[yare::parameterized(
    blank   = { "   " },
    symbols = { "!!!" },
)]
fn unusable_app_name_is_rejected(app_name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &FakeRunner::new());
    assert!(form(app_name, "", "", "").into_config(&ctx).is_err());
}

#[tokio::test]
async fn form_fields_are_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir, &FakeRunner::new());

    let config = form(" Budget Buddy ", "Svelte, Bun", " playful ", "Add expense\n\nExport CSV\n")
        .into_config(&ctx)
        .unwrap();
    assert_eq!(config.app_name, "Budget Buddy");
    assert_eq!(config.slug, "budget-buddy");
    assert_eq!(config.description, "Track spending");
    assert_eq!(config.tech_stack, vec!["Svelte", "Bun"]);
    assert_eq!(config.design, "playful");
    assert_eq!(config.features, vec!["Add expense", "Export CSV"]);
    assert_eq!(config.account.token, "tok-personal");

    let defaults = form("Budget Buddy", "", "  ", "").into_config(&ctx).unwrap();
    assert_eq!(defaults.tech_stack, DEFAULT_TECH_STACK.to_vec());
    assert_eq!(defaults.design, DEFAULT_DESIGN);
    assert!(defaults.features.is_empty());
}

#[tokio::test]
async fn submissions_report_queue_position() {
    let d = start().await;
    let Response::Submitted { job_id: first, position: 0 } = d.submit("personal", "First").await else {
        panic!("first submission should start immediately");
    };
    let Response::Submitted { job_id: second, position: 1 } = d.submit("personal", "Second").await
    else {
        panic!("second submission should wait behind the first");
    };
    eventually(|| d.runner.started() == vec![first]).await;

    let Response::Status { snapshot } = d.send(Request::Status).await else {
        panic!("expected status");
    };
    assert_eq!(snapshot.current.map(|c| c.job_id), Some(first));
    assert_eq!(snapshot.queued.iter().map(|q| q.job_id).collect::<Vec<_>>(), vec![second]);
}

#[tokio::test]
async fn cancel_stops_running_job() {
    let d = start().await;
    assert_eq!(d.send(Request::Cancel).await, Response::NothingRunning);

    let Response::Submitted { job_id, .. } = d.submit("personal", "Budget Buddy").await else {
        panic!("expected submission");
    };
    eventually(|| d.runner.running() == 1).await;

    let Response::Cancelled { app_name, .. } = d.send(Request::Cancel).await else {
        panic!("expected cancel");
    };
    assert_eq!(app_name, "Budget Buddy");
    eventually(|| d.runner.cancelled() == vec![job_id]).await;
    assert_eq!(d.send(Request::Cancel).await, Response::NothingRunning);
}

#[tokio::test]
async fn retry_resubmits_last_build() {
    let d = start().await;
    assert_eq!(d.send(Request::Retry).await, Response::NothingToRetry);

    let Response::Submitted { job_id, .. } = d.submit("personal", "Budget Buddy").await else {
        panic!("expected submission");
    };
    eventually(|| d.runner.running() == 1).await;
    d.runner.complete(job_id, Outcome::AuthExpired);
    eventually(|| d.ctx.queue.last_outcome().is_some()).await;

    let Response::Submitted { job_id: retried, position: 0 } = d.send(Request::Retry).await else {
        panic!("expected retry to start");
    };
    assert_ne!(retried, job_id);
    eventually(|| d.runner.started() == vec![job_id, retried]).await;
}

#[tokio::test]
async fn last_log_returns_tail_of_latest_job() {
    let d = start().await;
    assert_eq!(d.send(Request::LastLog).await, Response::NoLog);

    let Response::Submitted { job_id, .. } = d.submit("personal", "Budget Buddy").await else {
        panic!("expected submission");
    };
    eventually(|| d.runner.running() == 1).await;
    d.runner.complete(job_id, Outcome::Failure { message: "boom".to_string(), log_path: None });
    eventually(|| d.ctx.queue.last_outcome().is_some()).await;

    // The fake runner never writes the artifact
    assert!(matches!(d.send(Request::LastLog).await, Response::Error { .. }));

    let path = d.ctx.queue.last_outcome().unwrap().log_path.unwrap();
    assert!(path.starts_with(d.dir.path().join("logs")));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "npm ERR! boom\n[EXIT] code 1\n").unwrap();
    assert_eq!(
        d.send(Request::LastLog).await,
        Response::Log { path, tail: "npm ERR! boom\n[EXIT] code 1\n".to_string() }
    );
}

#[tokio::test]
async fn shutdown_request_notifies_daemon() {
    let d = start().await;
    assert_eq!(d.send(Request::Shutdown).await, Response::ShuttingDown);
    tokio::time::timeout(Duration::from_secs(1), d.ctx.shutdown.notified()).await.unwrap();
}

#[tokio::test]
async fn malformed_request_does_not_stop_listener() {
    let d = start().await;
    let mut stream = tokio::net::UnixStream::connect(d.client.socket_path()).await.unwrap();
    let payload = b"{not json";
    stream.write_all(&(payload.len() as u32).to_be_bytes()).await.unwrap();
    stream.write_all(payload).await.unwrap();
    drop(stream);

    assert!(matches!(d.send(Request::Ping).await, Response::Pong { .. }));
}
