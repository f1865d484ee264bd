// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for protocol serde.

use std::path::PathBuf;

use forge_core::{CurrentJob, JobId, QueueSnapshot, QueuedJob};
use proptest::prelude::*;

use super::*;

fn snapshot() -> QueueSnapshot {
    QueueSnapshot {
        current: Some(CurrentJob {
            job_id: JobId::from_raw(3),
            app_name: "Budget Buddy".into(),
            account_name: "personal-user".into(),
            elapsed_ms: 61_000,
        }),
        queued: vec![QueuedJob {
            position: 1,
            job_id: JobId::from_raw(4),
            app_name: "Habit Grid".into(),
            account_name: "work-user".into(),
            waiting_ms: 5_000,
        }],
    }
}

fn all_responses() -> Vec<Response> {
    vec![
        Response::Pong { uptime_secs: 42 },
        Response::Status { snapshot: snapshot() },
        Response::Status { snapshot: QueueSnapshot::default() },
        Response::Submitted { job_id: JobId::from_raw(7), position: 2 },
        Response::Cancelled { app_name: "Budget Buddy".into(), runtime_secs: 95 },
        Response::NothingRunning,
        Response::NothingToRetry,
        Response::Log { path: PathBuf::from("/logs/a.log"), tail: "[EXIT] code 0".into() },
        Response::NoLog,
        Response::ShuttingDown,
        Response::Error { message: "unknown account: side".into() },
    ]
}

proptest! {
    #[test]
    fn response_serde_roundtrip(resp in proptest::sample::select(all_responses())) {
        let encoded = encode(&resp).expect("encode");
        let decoded: Response = decode(&encoded).expect("decode");
        prop_assert_eq!(decoded, resp);
    }

    #[test]
    fn submit_preserves_arbitrary_form_text(
        app_name in ".*",
        description in ".*",
        tech_stack in ".*",
        features in "(.*\n){0,4}",
    ) {
        let req = Request::Submit {
            account: "personal".into(),
            app_name,
            description,
            tech_stack,
            design: String::new(),
            features,
        };
        let decoded: Request = decode(&encode(&req).expect("encode")).expect("decode");
        prop_assert_eq!(decoded, req);
    }
}

#[test]
fn job_ids_travel_as_plain_numbers() {
    let json = serde_json::to_value(Response::Submitted { job_id: JobId::from_raw(7), position: 0 })
        .unwrap();
    assert_eq!(json, serde_json::json!({ "type": "Submitted", "job_id": 7, "position": 0 }));
}
