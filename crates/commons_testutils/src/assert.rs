//! Structural JSON comparison.

use serde_json::Value;
use std::path::Path;

/// Panics with a line diff of the pretty-printed documents unless they are
/// structurally equal. Object key order is ignored.
#[track_caller]
pub fn assert_json_eq(actual: &Value, expected: &Value) {
    pretty_assertions::assert_eq!(actual, expected, "JSON mismatch");
}

/// Compares a raw response body with the JSON fixture at `fixture`.
#[track_caller]
pub fn assert_response_body_eq(actual: &[u8], fixture: impl AsRef<Path>) {
    let fixture = fixture.as_ref();
    let expected: Value = match std::fs::read(fixture).map(|raw| serde_json::from_slice(&raw)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => panic!("invalid fixture {}: {err}", fixture.display()),
        Err(err) => panic!("unreadable fixture {}: {err}", fixture.display()),
    };
    let actual: Value = match serde_json::from_slice(actual) {
        Ok(value) => value,
        Err(err) => panic!(
            "response body is not JSON ({err}): {}",
            String::from_utf8_lossy(actual)
        ),
    };
    assert_json_eq(&actual, &expected);
}
