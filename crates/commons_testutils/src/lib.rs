//! Helpers shared by the workspace's tests: JSON fixtures, structural JSON
//! assertions, multipart request bodies and in-process servers.

pub mod assert;
pub mod fixtures;
pub mod multipart;
pub mod request;
pub mod server;

pub use assert::{assert_json_eq, assert_response_body_eq};
pub use fixtures::{file_to_struct, response_json, FixtureError};
pub use multipart::MultipartBody;
pub use request::{oneshot, set_bearer, TestResponse};
pub use server::TestServer;
