//! HTTP responses produced by the dispatch engine

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::errors::{Error, INTERNAL_ERROR_MESSAGE};
use crate::protocol::envelope::{encode_error, encode_success};

/// Body sent when even the error envelope could not be encoded
const FALLBACK_BODY: &[u8] = br#"{"errors":[{"message":"Internal Error"}]}"#;

fn with_body(status: StatusCode, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// A response without a body
pub(crate) fn empty(status: StatusCode) -> Response<Bytes> {
    with_body(status, Bytes::new())
}

/// A `{"data": ...}` response
pub(crate) fn success<T: Serialize>(status: StatusCode, payload: &T) -> Response<Bytes> {
    match encode_success(payload) {
        Ok(body) => with_body(status, Bytes::from(body)),
        Err(e) => {
            error!("Failed to encode response payload: {}", e);
            internal_error()
        }
    }
}

/// A `{"errors": [...]}` response
pub(crate) fn error(status: StatusCode, message: &str, skip: bool) -> Response<Bytes> {
    match encode_error(message, skip) {
        Ok(body) => with_body(status, Bytes::from(body)),
        Err(e) => {
            error!("Failed to encode error envelope: {}", e);
            with_body(StatusCode::INTERNAL_SERVER_ERROR, Bytes::from_static(FALLBACK_BODY))
        }
    }
}

/// The error envelope for `err`, with its mapped status
pub(crate) fn from_error(err: &Error) -> Response<Bytes> {
    error(err.status_code(), &err.to_string(), err.is_skip())
}

/// The fixed response for faults caught at the dispatch boundary
pub(crate) fn internal_error() -> Response<Bytes> {
    error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE, false)
}

/// Set a static header on a response; `name` must be lowercase
pub(crate) fn set_header(response: &mut Response<Bytes>, name: &'static str, value: &'static str) {
    response
        .headers_mut()
        .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
}
