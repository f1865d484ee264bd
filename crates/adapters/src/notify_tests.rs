// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    empty   = { 0,   "[--------------------]" },
    ten     = { 10,  "[##------------------]" },
    rounds  = { 13,  "[###-----------------]" },
    ninety5 = { 95,  "[###################-]" },
    full    = { 100, "[####################]" },
    clamped = { 250, "[####################]" },
)]
fn progress_bar_cells(percentage: u8, expected: &str) {
    assert_eq!(progress_bar(percentage), expected);
}

#[test]
fn queued_body_names_position_and_current_build() {
    let event = NotifyEvent::Queued { position: 2, current_app: "Tracker".into() };
    assert_eq!(event.title("Budget"), "Queued: Budget");
    assert_eq!(event.body(), "#2 in queue. Current build: Tracker");
}

#[test]
fn failure_body_includes_log_path() {
    let event = NotifyEvent::Failure {
        message: "build did not complete (exit code 1)".into(),
        log_path: Some(PathBuf::from("/logs/x.log")),
    };
    assert!(event.body().ends_with("Logs: /logs/x.log"));
}

#[tokio::test]
async fn fake_sink_records_events() {
    let sink = FakeSink::new();
    sink.notify("App", &NotifyEvent::Progress { status: "Building".into(), percentage: 70 })
        .await
        .unwrap();
    sink.notify("App", &NotifyEvent::AuthExpired).await.unwrap();

    assert_eq!(sink.progress(), vec![70]);
    assert_eq!(sink.terminal(), vec![NotifyEvent::AuthExpired]);
    assert_eq!(sink.events()[0].0, "App");
}

#[tokio::test]
async fn fanout_delivers_to_all_and_reports_failure() {
    let failing = FakeSink::failing();
    let ok = FakeSink::new();
    let fanout = FanoutSink::new(vec![Arc::new(failing.clone()), Arc::new(ok.clone())]);

    let result = fanout.notify("App", &NotifyEvent::AuthExpired).await;

    assert!(result.is_err());
    assert_eq!(failing.events().len(), 1);
    assert_eq!(ok.events().len(), 1);
}

#[tokio::test]
async fn log_sink_never_fails() {
    LogSink.notify("App", &NotifyEvent::AuthExpired).await.unwrap();
}

#[tokio::test]
async fn detached_sink_delivers_in_order() {
    let fake = FakeSink::new();
    let detached = DetachedSink::spawn(Arc::new(fake.clone()));
    for pct in [10u8, 25, 40] {
        detached.send("App", NotifyEvent::Progress { status: "step".into(), percentage: pct });
    }
    detached.notify("App", &NotifyEvent::AuthExpired).await.unwrap();
    drop(detached);

    for _ in 0..100 {
        if fake.events().len() == 4 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(fake.progress(), vec![10, 25, 40]);
    assert_eq!(fake.terminal(), vec![NotifyEvent::AuthExpired]);
}

#[tokio::test]
async fn detached_sink_swallows_inner_failures() {
    let fake = FakeSink::failing();
    let detached = DetachedSink::spawn(Arc::new(fake.clone()));
    assert!(detached.notify("App", &NotifyEvent::AuthExpired).await.is_ok());
}
