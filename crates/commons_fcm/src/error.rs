use commons_core::WrappedError;
use thiserror::Error;

use crate::models::FcmResponse;

/// Errors that can occur when sending messages through FCM
#[derive(Error, Debug)]
pub enum FcmError {
    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// FCM answered with a status other than 200 or 204
    #[error("invalid status code received, expected 200/204, got {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// FCM accepted the request but reported an error in the body
    #[error("FCM API error: {}", .response.error.as_deref().unwrap_or_default())]
    Api { response: FcmResponse },

    /// Transport or decoding failure, with context
    #[error(transparent)]
    Wrapped(#[from] WrappedError),
}
