#![allow(missing_docs)]

use axum::http::StatusCode;
use baatchit_agent::{ChatRequest, validate_chat_request};

#[test]
fn validate_rejects_missing_message() {
    let body = ChatRequest {
        message: None,
        session_id: Some("s1".to_string()),
    };
    let (status, payload) = validate_chat_request(&body).expect_err("err");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload.status, "error");
    assert_eq!(payload.error, "Message is required");
}

#[test]
fn validate_rejects_blank_message() {
    let body = ChatRequest {
        message: Some("  \n ".to_string()),
        session_id: None,
    };
    let result = validate_chat_request(&body);
    assert_eq!(result.expect_err("err").0, StatusCode::BAD_REQUEST);
}

#[test]
fn validate_accepts_trimmed_values_and_drops_blank_session_id() {
    let body = ChatRequest {
        message: Some(" hello ".to_string()),
        session_id: Some("   ".to_string()),
    };
    let (session_id, message) = validate_chat_request(&body).expect("ok");
    assert_eq!(session_id, None);
    assert_eq!(message, "hello");

    let body = ChatRequest {
        message: Some("hello".to_string()),
        session_id: Some(" session_x_1 ".to_string()),
    };
    let (session_id, _) = validate_chat_request(&body).expect("ok");
    assert_eq!(session_id.as_deref(), Some("session_x_1"));
}

#[test]
fn request_body_uses_camel_case_session_id() {
    let body: ChatRequest =
        serde_json::from_str(r#"{"message":"hi","sessionId":"session_x_1"}"#).expect("parse");
    assert_eq!(body.session_id.as_deref(), Some("session_x_1"));
    let body: ChatRequest = serde_json::from_str("{}").expect("parse");
    assert!(body.message.is_none());
}
