// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;

const TIMEOUT: Duration = Duration::from_secs(1);

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::NothingRunning).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert_eq!(json_str, r#"{"type":"NothingRunning"}"#);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn request_survives_framing() {
    let request = Request::Submit {
        account: "personal".into(),
        app_name: "Budget Buddy".into(),
        description: "Track daily expenses".into(),
        tech_stack: "React, Vite".into(),
        design: String::new(),
        features: "Add expense\nMonthly chart".into(),
    };
    let mut buffer = Vec::new();
    write_request(&mut buffer, &request, TIMEOUT).await.unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    assert_eq!(read_request(&mut cursor, TIMEOUT).await.unwrap(), request);
}

#[tokio::test]
async fn eof_before_prefix_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn truncated_payload_is_io_error() {
    let mut cursor = std::io::Cursor::new(vec![0, 0, 0, 10, b'{']);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Io(_)));
}

#[tokio::test]
async fn oversized_prefix_is_rejected() {
    let mut cursor = std::io::Cursor::new(u32::MAX.to_be_bytes().to_vec());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn silent_peer_times_out() {
    let (mut client, _server) = tokio::io::duplex(64);
    let err = read_response(&mut client, Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}

#[test]
fn submit_defaults_optional_fields() {
    let request: Request = decode(
        br#"{"type":"Submit","account":"work","app_name":"Habit Grid","description":"Daily habits"}"#,
    )
    .unwrap();
    let Request::Submit { tech_stack, design, features, .. } = request else {
        panic!("expected submit");
    };
    assert!(tech_stack.is_empty() && design.is_empty() && features.is_empty());
}

#[test]
fn unknown_request_type_is_json_error() {
    let err = decode::<Request>(br#"{"type":"Explode"}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}
