//! The uniform `{status, data?, error?}` response body.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use crate::error::ApiError;

pub const SUCCESS_STATUS: &str = "success";
pub const FAILURE_STATUS: &str = "error";

/// Envelope around every JSON response body.
///
/// Exactly one of `data` and `error` is populated, matching `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericResponse<T = serde_json::Value> {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> GenericResponse<T> {
    /// Wraps a payload in a success envelope.
    pub fn success(data: T) -> Self {
        Self {
            status: SUCCESS_STATUS.to_string(),
            data: Some(data),
            error: None,
        }
    }

    /// Wraps any error in a failure envelope.
    ///
    /// An [`ApiError`] is carried as is; any other error is reduced to its message.
    pub fn failure(err: &(dyn StdError + 'static)) -> Self {
        let error = match err.downcast_ref::<ApiError>() {
            Some(api_error) => api_error.clone(),
            None => ApiError::from_message(err.to_string()),
        };
        Self::from_api_error(error)
    }

    pub fn from_api_error(error: ApiError) -> Self {
        Self {
            status: FAILURE_STATUS.to_string(),
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Params;
    use serde_json::json;
    use std::io;

    #[test]
    fn success_envelope_wire_form() {
        let body = serde_json::to_value(GenericResponse::success(json!({"id": 7}))).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"id": 7}}));
    }

    #[test]
    fn failure_envelope_keeps_api_error_structure() {
        let err = ApiError::bad_request(Params::new("id", "id not found in request"));
        let body = serde_json::to_value(GenericResponse::<()>::failure(&err)).unwrap();
        assert_eq!(
            body,
            json!({
                "status": "error",
                "error": {
                    "code": "invalid request body",
                    "message": "One or more inputs are invalid, please enter valid information",
                    "params": {"id": "id not found in request"}
                }
            })
        );
    }

    #[test]
    fn failure_envelope_reduces_foreign_errors_to_a_message() {
        let err = io::Error::new(io::ErrorKind::Other, "disk full");
        let body = serde_json::to_value(GenericResponse::<()>::failure(&err)).unwrap();
        assert_eq!(body, json!({"status": "error", "error": {"message": "disk full"}}));
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let raw = r#"{"status":"error","error":{"message":"Authentication credentials are invalid"}}"#;
        let envelope: GenericResponse = serde_json::from_str(raw).unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
        assert!(crate::error::is_unauthenticated(&envelope.error.unwrap()));
    }
}
