use commons_core::WrappedError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwilioError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Exception(#[from] TwilioException),

    #[error("unexpected response code {status}, body {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error(transparent)]
    Wrapped(#[from] WrappedError),
}

/// The JSON error object Twilio returns with non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilioException {
    /// HTTP status, as Twilio reports it
    #[serde(default, deserialize_with = "string_or_number")]
    pub status: String,
    pub message: String,
    /// Twilio specific error code
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub more_info: String,
}

impl fmt::Display for TwilioException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code != 0 {
            write!(f, "Code {}: {}", self.code, self.message)
        } else if !self.status.is_empty() {
            write!(f, "Status {}: {}", self.status, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for TwilioException {}

// Twilio sends `status` as a number; older payloads used a string.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exception(status: &str, code: i64) -> TwilioException {
        TwilioException {
            status: status.into(),
            message: "The 'To' number is not valid".into(),
            code,
            more_info: String::new(),
        }
    }

    #[test]
    fn display_prefers_code_then_status() {
        assert_eq!(
            exception("400", 21211).to_string(),
            "Code 21211: The 'To' number is not valid"
        );
        assert_eq!(
            exception("400", 0).to_string(),
            "Status 400: The 'To' number is not valid"
        );
        assert_eq!(exception("", 0).to_string(), "The 'To' number is not valid");
    }

    #[test]
    fn status_may_be_numeric() {
        let raw = r#"{"code":20003,"message":"Authenticate","more_info":"https://www.twilio.com/docs/errors/20003","status":401}"#;
        let exception: TwilioException = serde_json::from_str(raw).unwrap();
        assert_eq!(exception.status, "401");
        assert_eq!(exception.code, 20003);
    }
}
