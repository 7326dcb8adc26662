use axum::{body::Body, Router};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Deserializes the body, panicking with the raw text when it does not fit `T`.
    #[track_caller]
    pub fn json<T: DeserializeOwned>(&self) -> T {
        match serde_json::from_slice(&self.body) {
            Ok(value) => value,
            Err(err) => panic!(
                "unexpected response body ({err}): {}",
                String::from_utf8_lossy(&self.body)
            ),
        }
    }

    #[track_caller]
    pub fn json_value(&self) -> Value {
        self.json()
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Sends one request through `router` without binding a socket.
pub async fn oneshot(router: Router, request: Request<Body>) -> TestResponse {
    let response = match router.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status();
    let headers = response.headers().clone();
    let body = match axum::body::to_bytes(response.into_body(), usize::MAX).await {
        Ok(body) => body,
        Err(err) => panic!("unable to read response body: {err}"),
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Sets `Authorization: Bearer <token>`.
pub fn set_bearer(headers: &mut HeaderMap, token: &str) {
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(value) => {
            headers.insert(header::AUTHORIZATION, value);
        }
        Err(err) => panic!("token is not a valid header value: {err}"),
    }
}
