//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("dish store error: relation \"dishes\" does not exist")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"sql": "SELECT"}))
}

#[fixture]
fn validation_case(expected_trace_id: String) -> Error {
    Error::invalid_request("validation failed")
        .with_trace_id(expected_trace_id)
        .with_details(json!({
            "code": "validation_failed",
            "errors": [{"field": "name", "message": "must not be empty"}],
        }))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("admin only"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("store down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    #[from(internal_error_case)] internal_error: Error,
    expected_trace_id: String,
) {
    let redacted = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn validation_findings_reach_the_client(
    #[from(validation_case)] invalid: Error,
    expected_trace_id: String,
) {
    let payload = assert_error_response(
        invalid,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    let field = payload
        .details()
        .and_then(|details| details.pointer("/errors/0/field"))
        .and_then(serde_json::Value::as_str);
    assert_eq!(field, Some("name"));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::not_found("dish missing");

    let payload = assert_error_response(error, StatusCode::NOT_FOUND, None).await;
    assert_eq!(payload.message(), "dish missing");
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
fn client_side_actix_errors_stay_invalid_requests() {
    let err: Error = actix_web::error::ErrorBadRequest("payload too large").into();

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "payload too large");
}

#[rstest]
fn server_side_actix_errors_are_redacted() {
    let err: Error = actix_web::error::ErrorInternalServerError("pool exploded").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}

#[rstest]
#[actix_web::test]
async fn unavailable_store_keeps_its_message() {
    let payload = assert_error_response(
        Error::service_unavailable("restaurant store unavailable"),
        StatusCode::SERVICE_UNAVAILABLE,
        None,
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(payload.message(), "restaurant store unavailable");
}
