//! Structured API errors.
//!
//! [`ApiError`] is the error value the HTTP layer understands natively. It carries a
//! machine friendly `code`, a human friendly `message` and an optional set of
//! [`Params`] naming the offending inputs. Four well-known kinds are recognised by the
//! classification predicates ([`is_bad_request`], [`is_unauthorized`],
//! [`is_unauthenticated`], [`is_server_error`]), which look through any chain of
//! wrapping errors before inspecting the root cause.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

const INVALID_REQ_BODY_CODE: &str = "invalid request body";
const INVALID_REQ_BODY_MESSAGE: &str =
    "One or more inputs are invalid, please enter valid information";
const SERVER_ERROR_CODE: &str = "Internal server error";
const SERVER_ERROR_MESSAGE: &str = "Something unplanned for has gone wrong";
const UNAUTHORIZED_MESSAGE: &str = "Authentication details were not provided";
const UNAUTHENTICATED_MESSAGE: &str = "Authentication credentials are invalid";

/// A boxed, thread-safe error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The well-known kinds an [`ApiError`] can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// Caller-fixable input errors.
    BadRequest,
    /// Credentials were not provided.
    Unauthorized,
    /// Credentials were provided but are invalid.
    Unauthenticated,
    /// Internal faults.
    ServerError,
    /// Any error not built from one of the well-known signatures.
    #[default]
    Other,
}

impl ErrorKind {
    /// Recovers the kind from a `(code, message)` signature.
    fn from_signature(code: &str, message: &str) -> Self {
        if code == INVALID_REQ_BODY_CODE {
            ErrorKind::BadRequest
        } else if code == SERVER_ERROR_CODE {
            ErrorKind::ServerError
        } else if message == UNAUTHORIZED_MESSAGE {
            ErrorKind::Unauthorized
        } else if message == UNAUTHENTICATED_MESSAGE {
            ErrorKind::Unauthenticated
        } else {
            ErrorKind::Other
        }
    }
}

/// A single parameter value attached to an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Map(BTreeMap<String, ParamValue>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        // JSON has no representation for NaN or infinities
        match serde_json::Number::from_f64(value) {
            Some(number) => ParamValue::Number(number),
            None => ParamValue::String(value.to_string()),
        }
    }
}

impl From<Params> for ParamValue {
    fn from(value: Params) -> Self {
        ParamValue::Map(value.0)
    }
}

/// Named parameters describing an error, serialized with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Builds a single-entry parameter map.
    pub fn new(key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let mut params = Self::default();
        params.insert(key, value);
        params
    }

    /// Adds an entry, returning the updated map.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Converts the params to a bad request error.
    pub fn to_bad_request(self) -> ApiError {
        ApiError::bad_request(self)
    }

    /// Converts the params to an unauthorized error.
    pub fn to_unauthorized(self) -> ApiError {
        ApiError::unauthorized(self)
    }

    /// Converts the params to an unauthenticated error.
    pub fn to_unauthenticated(self) -> ApiError {
        ApiError::unauthenticated(self)
    }

    /// Converts the params to an internal server error.
    pub fn to_server_error(self) -> ApiError {
        ApiError::server_error(self)
    }
}

/// A structured API error.
///
/// The wire form is `{"code", "message", "params"}` where `code` and `params` are
/// omitted when empty. The [`ErrorKind`] tag never appears on the wire; it is
/// recovered from the `(code, message)` signature when an error is deserialized or
/// built through [`ApiError::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ApiErrorRepr")]
pub struct ApiError {
    #[serde(skip)]
    kind: ErrorKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Params::is_empty")]
    params: Params,
}

#[derive(Deserialize)]
struct ApiErrorRepr {
    #[serde(default)]
    code: String,
    message: String,
    #[serde(default)]
    params: Params,
}

impl From<ApiErrorRepr> for ApiError {
    fn from(repr: ApiErrorRepr) -> Self {
        ApiError::new(repr.code, repr.message, repr.params)
    }
}

impl ApiError {
    /// Creates an error from its parts. The kind is derived from the signature.
    pub fn new(code: impl Into<String>, message: impl Into<String>, params: Params) -> Self {
        let code = code.into();
        let message = message.into();
        Self {
            kind: ErrorKind::from_signature(&code, &message),
            code,
            message,
            params,
        }
    }

    /// Creates an error that only carries a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new(String::new(), message, Params::default())
    }

    pub fn bad_request(params: Params) -> Self {
        Self {
            kind: ErrorKind::BadRequest,
            code: INVALID_REQ_BODY_CODE.to_string(),
            message: INVALID_REQ_BODY_MESSAGE.to_string(),
            params,
        }
    }

    /// Credentials were not provided. `params` are not carried.
    pub fn unauthorized(_params: Params) -> Self {
        Self {
            kind: ErrorKind::Unauthorized,
            code: String::new(),
            message: UNAUTHORIZED_MESSAGE.to_string(),
            params: Params::default(),
        }
    }

    /// Credentials were provided but are invalid. `params` are not carried.
    pub fn unauthenticated(_params: Params) -> Self {
        Self {
            kind: ErrorKind::Unauthenticated,
            code: String::new(),
            message: UNAUTHENTICATED_MESSAGE.to_string(),
            params: Params::default(),
        }
    }

    pub fn server_error(params: Params) -> Self {
        Self {
            kind: ErrorKind::ServerError,
            code: SERVER_ERROR_CODE.to_string(),
            message: SERVER_ERROR_MESSAGE.to_string(),
            params,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_pretty_json() {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "Unmarshed error message: {}", self.code),
        }
    }
}

impl StdError for ApiError {}

/// An error annotated with a context message.
///
/// The wrapped error stays reachable through [`StdError::source`], so classification
/// still sees the original cause.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct WrappedError {
    context: String,
    #[source]
    source: BoxError,
}

impl WrappedError {
    pub fn new(context: impl fmt::Display, source: impl Into<BoxError>) -> Self {
        Self {
            context: context.to_string(),
            source: source.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Adds context to the error side of a `Result`.
pub trait Context<T> {
    /// Wraps the error with a context message.
    fn context<C>(self, context: C) -> Result<T, WrappedError>
    where
        C: fmt::Display;

    /// Wraps the error with a lazily built context message.
    fn with_context<C, F>(self, f: F) -> Result<T, WrappedError>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, WrappedError>
    where
        C: fmt::Display,
    {
        self.map_err(|error| WrappedError::new(context, error))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, WrappedError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|error| WrappedError::new(f(), error))
    }
}

/// Follows `source()` links until the innermost error.
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

/// Returns the root cause as an [`ApiError`], if it is one.
pub fn as_api_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ApiError> {
    root_cause(err).downcast_ref::<ApiError>()
}

/// Classifies an error by the kind of its root cause.
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorKind {
    as_api_error(err).map_or(ErrorKind::Other, ApiError::kind)
}

pub fn is_bad_request(err: &(dyn StdError + 'static)) -> bool {
    classify(err) == ErrorKind::BadRequest
}

pub fn is_unauthorized(err: &(dyn StdError + 'static)) -> bool {
    classify(err) == ErrorKind::Unauthorized
}

pub fn is_unauthenticated(err: &(dyn StdError + 'static)) -> bool {
    classify(err) == ErrorKind::Unauthenticated
}

pub fn is_server_error(err: &(dyn StdError + 'static)) -> bool {
    classify(err) == ErrorKind::ServerError
}
