//! Tests for the error payload constructors and serde contract.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::missing_credential(), ErrorCode::MissingCredential)]
#[case(Error::invalid_credential(), ErrorCode::InvalidCredential)]
#[case(Error::forbidden("unauthorized access"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn credential_errors_share_the_public_message() {
    assert_eq!(Error::missing_credential().message(), "forbidden access");
    assert_eq!(Error::invalid_credential().message(), "forbidden access");
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_camel_case_and_skips_absent_fields(expected_trace_id: String) {
    let error = Error::conflict("User already exists")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"key": "email"}));
    let value = serde_json::to_value(&error).expect("error serialises");

    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "User already exists",
            "traceId": expected_trace_id,
            "details": {"key": "email"},
        })
    );

    let bare = serde_json::to_value(Error::not_found("missing")).expect("error serialises");
    assert!(bare.get("traceId").is_none());
    assert!(bare.get("details").is_none());
}

#[rstest]
fn redaction_only_touches_internal_errors(expected_trace_id: String) {
    let internal = Error::internal("db password leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));
    let redacted = internal.redacted();
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());
    assert_eq!(redacted.trace_id(), Some(expected_trace_id.as_str()));

    let conflict = Error::conflict("taken").with_details(json!({"key": "vote"}));
    assert_eq!(conflict.redacted(), conflict);
}

#[rstest]
fn builders_override_captured_fields(base_error: Error, expected_trace_id: String) {
    let error = base_error
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"field": "email"}));
    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
    assert_eq!(error.details(), Some(&json!({"field": "email"})));
    assert_eq!(error.to_string(), "bad");
}
