//! Response writers.
//!
//! Every JSON response carries [`STANDARD_HEADERS`]. Errors are routed through
//! [`write_error`], which classifies them and picks the status code and body.

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Response,
};
use bytes::Bytes;
use serde::Serialize;
use std::error::Error as StdError;
use tracing::{error, warn};

use super::envelope::GenericResponse;
use super::sniff::sniff_content_type;
use crate::error::{as_api_error, ApiError, ErrorKind, Params};
use crate::logging::log_error;

/// Headers set on every JSON response.
pub const STANDARD_HEADERS: [(HeaderName, &str); 5] = [
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "OPTIONS,POST,GET"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::CONTENT_TYPE, "application/json"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
];

// Written when even the canonical internal error body cannot be serialized.
const STATIC_INTERNAL_ERROR_BODY: &[u8] = br#"{"status":"error","error":{"code":"Internal server error","message":"Something unplanned for has gone wrong"}}"#;

fn apply_standard_headers(headers: &mut HeaderMap) {
    for (name, value) in STANDARD_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    apply_standard_headers(response.headers_mut());
    response
}

/// Serializes `value` as the response body.
///
/// Falls back to the internal error response when `value` cannot be serialized.
pub fn write_json<T>(value: &T, status: StatusCode) -> Response
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(value) {
        Ok(body) => json_response(status, body),
        Err(err) => write_internal_error(&err),
    }
}

/// Wraps `value` in a success envelope and writes it.
pub fn write_success<T: Serialize>(value: T, status: StatusCode) -> Response {
    write_json(&GenericResponse::success(value), status)
}

/// Standard headers and `204 No Content`.
pub fn write_no_content() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    apply_standard_headers(response.headers_mut());
    response
}

/// Writes raw bytes as a file download with a sniffed content type.
pub fn write_file(name: &str, data: impl Into<Bytes>) -> Response {
    let data = data.into();
    let content_type = HeaderValue::from_str(&sniff_content_type(&data))
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));

    let file_name: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let disposition = HeaderValue::from_str(&format!(r#"attachment; filename="{file_name}""#))
        .unwrap_or(HeaderValue::from_static("attachment"));

    let mut response = Response::new(Body::from(data));
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    response
}

/// Maps an error to its response.
///
/// | classification  | status |
/// |-----------------|--------|
/// | bad request     | 400    |
/// | unauthorized    | 401    |
/// | unauthenticated | 403    |
/// | anything else   | 500    |
///
/// Classification looks at the root cause, so a wrapped [`ApiError`] keeps its status and
/// the body renders that root error rather than the wrapper's message. Server errors are
/// logged in full but only the canonical message reaches the client.
pub fn write_error(err: &(dyn StdError + 'static)) -> Response {
    let Some(api_error) = as_api_error(err) else {
        return write_internal_error(err);
    };
    let status = match api_error.kind() {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Unauthenticated => StatusCode::FORBIDDEN,
        ErrorKind::ServerError | ErrorKind::Other => return write_internal_error(err),
    };
    warn!(status = status.as_u16(), error = %err, "request failed");

    let envelope = GenericResponse::<()>::from_api_error(api_error.clone());
    match serde_json::to_vec(&envelope) {
        Ok(body) => json_response(status, body),
        Err(err) => write_internal_error(&err),
    }
}

fn write_internal_error(err: &(dyn StdError + 'static)) -> Response {
    log_error(err, "internal server error");

    let envelope = GenericResponse::<()>::from_api_error(ApiError::server_error(Params::default()));
    match serde_json::to_vec(&envelope) {
        Ok(body) => json_response(StatusCode::INTERNAL_SERVER_ERROR, body),
        Err(err) => {
            error!(error = %err, "unable to serialize internal error body");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                STATIC_INTERNAL_ERROR_BODY.to_vec(),
            )
        }
    }
}
