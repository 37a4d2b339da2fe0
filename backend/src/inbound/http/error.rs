//! HTTP mapping for domain errors.
//!
//! The domain `Error` stays transport agnostic; this module decides status
//! codes, redacts internal failures and echoes the trace identifier.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorKind};
use crate::middleware::TRACE_ID_HEADER;

pub use crate::domain::ApiResult;

/// Client-facing message for every internal failure.
pub(crate) const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::InvalidCredentials | ErrorKind::InvalidTransition => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(err: &Error) -> Error {
    if status_for(err.kind()) != StatusCode::INTERNAL_SERVER_ERROR {
        return err.clone();
    }
    error!(
        message = err.message(),
        trace_id = err.trace_id().unwrap_or_default(),
        "internal error returned to client"
    );
    let redacted = Error::internal(REDACTED_MESSAGE);
    match err.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}
