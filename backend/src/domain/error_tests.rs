//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
        .parse()
        .expect("valid UUID");
    let expected = trace_id.to_string();
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(expected.as_str()));
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
fn serialises_code_in_snake_case_and_omits_empty_fields() {
    let value = serde_json::to_value(Error::service_unavailable("db down")).expect("serialise");
    assert_eq!(
        value,
        json!({ "code": "service_unavailable", "message": "db down" })
    );
}

#[rstest]
fn details_round_trip_through_json() {
    let error = Error::invalid_request("bad cursor")
        .with_details(json!({ "field": "cursor" }))
        .with_trace_id("abc");
    let json = serde_json::to_string(&error).expect("serialise");
    let decoded: Error = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(decoded, error);
}
