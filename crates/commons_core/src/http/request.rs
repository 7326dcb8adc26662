//! Request decoding: JSON bodies, UUID path parameters and multipart uploads.

use axum::{
    extract::{RawPathParams, Request},
    RequestExt,
};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;
use uuid::Uuid;

pub use super::multipart::{FilePart, MultipartForm, MAX_UPLOAD_MEMORY};
use super::sniff::sniff_content_type;
use crate::error::{ApiError, Context, Params, WrappedError};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    Api(#[source] ApiError),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("request Content-Type isn't multipart/form-data")]
    NotMultipart,

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("multipart: message too large")]
    MessageTooLarge,

    #[error("no such file")]
    MissingFile,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Wrapped(#[from] WrappedError),
}

impl From<ApiError> for RequestError {
    fn from(err: ApiError) -> Self {
        RequestError::Api(err)
    }
}

/// A file extracted from a multipart upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    /// The form field the file was posted under.
    pub upload_key: String,
    #[serde(rename = "filename")]
    pub file_name: String,
    #[serde(with = "base64_bytes")]
    pub data: Bytes,
    /// Sniffed from `data`; never taken from the part's headers.
    pub content_type: String,
}

/// Files and text fields extracted from one multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileWithBody {
    pub files: Vec<FileDetails>,
    pub body: BTreeMap<String, Vec<String>>,
}

/// Largest JSON body [`decode_json`] reads, matching axum's default body limit.
pub const MAX_JSON_BODY: usize = 2 * 1024 * 1024;

/// Reads the whole body and deserializes it as JSON.
///
/// An empty body is a bad request. Bodies over [`MAX_JSON_BODY`] fail with
/// [`RequestError::Body`]. Any other decoding failure is returned as is.
pub async fn decode_json<T: DeserializeOwned>(request: Request) -> Result<T, RequestError> {
    let body = axum::body::to_bytes(request.into_body(), MAX_JSON_BODY).await?;
    decode_json_bytes(&body)
}

pub fn decode_json_bytes<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request(Params::new("error", "No request body was passed")).into());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Reads the path parameter `name` as a version 4 UUID.
pub async fn extract_uuid(request: &mut Request, name: &str) -> Result<Uuid, RequestError> {
    let params = request.extract_parts::<RawPathParams>().await.ok();
    let value = params
        .as_ref()
        .and_then(|params| params.iter().find(|(key, _)| *key == name))
        .map(|(_, value)| value);
    Ok(parse_uuid_param(value, name)?)
}

/// Validates a raw path parameter value as a version 4 UUID.
pub fn parse_uuid_param(value: Option<&str>, name: &str) -> Result<Uuid, ApiError> {
    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(ApiError::bad_request(Params::new(
                name,
                format!("{name} not found in request"),
            )))
        }
    };
    crate::id::uuid_from_str(value)
        .map_err(|_| ApiError::bad_request(Params::new(name, "Invalid ID. Expected type UUID")))
}

/// Returns the bytes of the first file posted under `field`.
pub async fn extract_file(request: Request, field: &str) -> Result<Bytes, RequestError> {
    extract_file_with(request, field, MAX_UPLOAD_MEMORY).await
}

/// [`extract_file`] with an explicit in-memory budget.
pub async fn extract_file_with(
    request: Request,
    field: &str,
    max_memory: usize,
) -> Result<Bytes, RequestError> {
    let form = MultipartForm::parse(request, max_memory).await?;
    let part = form
        .files(field)
        .first()
        .ok_or(RequestError::MissingFile)
        .with_context(|| format!("Unable to get file: {field}"))?;
    part.read().await
}

/// Extracts every file posted under `keys`, in key order and then arrival order.
pub async fn extract_files(request: Request, keys: &[&str]) -> Result<Vec<FileDetails>, RequestError> {
    extract_files_with(request, keys, MAX_UPLOAD_MEMORY).await
}

/// [`extract_files`] with an explicit in-memory budget, usually
/// `HttpConfig::max_upload_memory`.
pub async fn extract_files_with(
    request: Request,
    keys: &[&str],
    max_memory: usize,
) -> Result<Vec<FileDetails>, RequestError> {
    let form = MultipartForm::parse(request, max_memory).await?;
    collect_files(&form, keys).await
}

/// Extracts the values of `text_keys` and the files posted under `file_keys`.
pub async fn extract_body_and_files(
    request: Request,
    file_keys: &[&str],
    text_keys: &[&str],
) -> Result<FileWithBody, RequestError> {
    extract_body_and_files_with(request, file_keys, text_keys, MAX_UPLOAD_MEMORY).await
}

pub async fn extract_body_and_files_with(
    request: Request,
    file_keys: &[&str],
    text_keys: &[&str],
    max_memory: usize,
) -> Result<FileWithBody, RequestError> {
    let form = MultipartForm::parse(request, max_memory).await?;
    let body = collect_values(&form, text_keys);
    let files = collect_files(&form, file_keys).await?;
    Ok(FileWithBody { files, body })
}

pub async fn collect_files(form: &MultipartForm, keys: &[&str]) -> Result<Vec<FileDetails>, RequestError> {
    let mut files = Vec::new();
    for key in keys {
        for part in form.files(key) {
            let data = part.read().await?;
            files.push(FileDetails {
                upload_key: key.to_string(),
                file_name: part.file_name().to_string(),
                content_type: sniff_content_type(&data),
                data,
            });
        }
    }
    Ok(files)
}

pub fn collect_values(form: &MultipartForm, keys: &[&str]) -> BTreeMap<String, Vec<String>> {
    keys.iter()
        .map(|key| (key.to_string(), form.values(key).to_vec()))
        .collect()
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
