//! HTTP helpers: the response envelope, request decoding and response writing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

use crate::error::{ApiError, BoxError};

pub mod envelope;
pub mod multipart;
pub mod request;
pub mod response;
pub mod sniff;

use request::RequestError;
use response::{write_error, write_success};

/// Error type for axum handlers.
///
/// Any error converts into it with `?`; the response is chosen by [`write_error`], so
/// an [`ApiError`] anywhere at the root of the chain keeps its status and body.
pub struct HandlerError(BoxError);

impl HandlerError {
    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl<E> From<E> for HandlerError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        HandlerError(Box::new(err))
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        write_error(&*self.0)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        write_error(&self)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        write_error(&self)
    }
}

/// Writes `Ok` values as a success envelope with `status` and errors through
/// [`write_error`].
pub fn handle_result<T, E>(result: Result<T, E>, status: StatusCode) -> Response
where
    T: Serialize,
    E: StdError + 'static,
{
    match result {
        Ok(value) => write_success(value, status),
        Err(err) => write_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Context, Params};
    use std::io;

    fn failing_lookup() -> Result<u32, HandlerError> {
        let value: Result<u32, ApiError> = Err(ApiError::unauthorized(Params::default()));
        Ok(value.context("checking session")?)
    }

    #[test]
    fn handler_error_keeps_the_classification() {
        let response = failing_lookup().unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn foreign_handler_errors_become_500() {
        let err: HandlerError = io::Error::new(io::ErrorKind::Other, "db exploded").into();
        assert_eq!(err.to_string(), "db exploded");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn handle_result_picks_the_status() {
        let ok: Result<&str, ApiError> = Ok("fine");
        assert_eq!(handle_result(ok, StatusCode::ACCEPTED).status(), StatusCode::ACCEPTED);

        let err: Result<&str, ApiError> = Err(ApiError::bad_request(Params::new("a", "b")));
        assert_eq!(handle_result(err, StatusCode::OK).status(), StatusCode::BAD_REQUEST);
    }
}
