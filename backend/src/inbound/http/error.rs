//! HTTP rendering of domain errors.
//!
//! The status code follows the [`ErrorCode`]; the `trace-id` header repeats
//! the body's `traceId`. Internal failures are logged in full and replaced by
//! a generic message before they reach the client.

use std::borrow::Cow;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The payload a client may see for `error`.
fn client_view(error: &Error) -> Cow<'_, Error> {
    let trace_id = error.trace_id().unwrap_or("-");
    match error.code() {
        ErrorCode::InternalError => {
            error!(message = error.message(), trace_id, "internal error returned to client");
            let redacted = Error::internal(REDACTED_MESSAGE);
            Cow::Owned(match error.trace_id() {
                Some(id) => redacted.with_trace_id(id.to_owned()),
                None => redacted,
            })
        }
        ErrorCode::ServiceUnavailable => {
            warn!(message = error.message(), trace_id, "store unavailable for request");
            Cow::Borrowed(error)
        }
        _ => Cow::Borrowed(error),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(&*client_view(self))
    }
}

/// Framework errors raised before a handler runs.
///
/// Client-side failures such as unreadable payloads keep their category as
/// `invalid_request`; anything else becomes a redacted internal error.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_client_error() {
            Error::invalid_request(err.to_string())
        } else {
            error!(error = %err, "actix error promoted to domain error");
            Error::internal(REDACTED_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests;
