//! Bounded-memory `multipart/form-data` parsing.
//!
//! The body is streamed through `multer` rather than axum's `Multipart` extractor, so
//! the router's `DefaultBodyLimit` does not cap uploads. Memory use is bounded by the
//! budget handed to [`MultipartForm::parse`] instead.

use axum::{extract::Request, http::header::CONTENT_TYPE};
use bytes::{Bytes, BytesMut};
use multer::Field;
use std::collections::HashMap;
use std::io;
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use super::request::RequestError;
use crate::error::Context;

/// In-memory budget for a parsed form, in bytes.
pub const MAX_UPLOAD_MEMORY: usize = 20_000_000;

enum PartStorage {
    Memory(Bytes),
    Spilled(NamedTempFile),
}

/// A file part of a parsed form.
pub struct FilePart {
    file_name: String,
    content_type: Option<String>,
    storage: PartStorage,
}

impl FilePart {
    /// The client-supplied filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The `Content-Type` the client asserted for this part, if any.
    pub fn declared_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Whether the part exceeded the memory budget and lives on disk.
    pub fn is_spilled(&self) -> bool {
        matches!(self.storage, PartStorage::Spilled(_))
    }

    /// Reads the full payload, from memory or from its temporary file.
    pub async fn read(&self) -> Result<Bytes, RequestError> {
        let file = match &self.storage {
            PartStorage::Memory(data) => return Ok(data.clone()),
            PartStorage::Spilled(file) => file,
        };
        let mut handle = File::open(file.path())
            .await
            .with_context(|| format!("Unable to open file {}", self.file_name))?;
        let mut data = Vec::new();
        handle
            .read_to_end(&mut data)
            .await
            .context("Unable to read file")?;
        Ok(Bytes::from(data))
    }
}

/// A parsed `multipart/form-data` body.
///
/// Text values and file parts are grouped by field name in arrival order. File parts
/// that do not fit in the remaining memory budget are written to temporary files,
/// which are removed when the form is dropped.
#[derive(Default)]
pub struct MultipartForm {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<FilePart>>,
}

impl MultipartForm {
    pub async fn parse(request: Request, max_memory: usize) -> Result<Self, RequestError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or(RequestError::NotMultipart)?;
        let boundary = match multer::parse_boundary(content_type) {
            Ok(boundary) => boundary,
            Err(multer::Error::NoMultipart) => return Err(RequestError::NotMultipart),
            Err(err) => return Err(err.into()),
        };

        let stream = request.into_body().into_data_stream();
        let mut multipart = multer::Multipart::new(stream, boundary);
        let mut form = Self::default();
        let mut remaining = max_memory;

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                None => {
                    let value = field.text().await?;
                    remaining = remaining
                        .checked_sub(value.len())
                        .ok_or(RequestError::MessageTooLarge)?;
                    form.values.entry(name).or_default().push(value);
                }
                Some(file_name) => {
                    let content_type = field.content_type().map(ToString::to_string);
                    let storage = buffer_part(&mut field, &mut remaining).await?;
                    if matches!(storage, PartStorage::Spilled(_)) {
                        debug!(field = %name, file_name = %file_name, "multipart part spilled to disk");
                    }
                    form.files.entry(name).or_default().push(FilePart {
                        file_name,
                        content_type,
                        storage,
                    });
                }
            }
        }
        Ok(form)
    }

    /// Values posted under `name`, in arrival order.
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// File parts posted under `name`, in arrival order.
    pub fn files(&self, name: &str) -> &[FilePart] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

struct Spill {
    file: NamedTempFile,
    handle: File,
}

impl Spill {
    async fn create() -> io::Result<Self> {
        let (file, handle) = tokio::task::spawn_blocking(|| -> io::Result<_> {
            let file = NamedTempFile::new()?;
            let handle = file.reopen()?;
            Ok((file, handle))
        })
        .await
        .map_err(io::Error::other)??;
        Ok(Self {
            file,
            handle: File::from_std(handle),
        })
    }
}

async fn buffer_part(
    field: &mut Field<'_>,
    remaining: &mut usize,
) -> Result<PartStorage, RequestError> {
    let mut buffer = BytesMut::new();
    let mut spill: Option<Spill> = None;

    while let Some(chunk) = field.chunk().await? {
        match spill.as_mut() {
            Some(open) => open.handle.write_all(&chunk).await?,
            None if buffer.len() + chunk.len() > *remaining => {
                let mut created = Spill::create().await?;
                created.handle.write_all(&buffer).await?;
                created.handle.write_all(&chunk).await?;
                buffer.clear();
                spill = Some(created);
            }
            None => buffer.extend_from_slice(&chunk),
        }
    }

    match spill {
        Some(mut spill) => {
            spill.handle.flush().await?;
            Ok(PartStorage::Spilled(spill.file))
        }
        None => {
            *remaining -= buffer.len();
            Ok(PartStorage::Memory(buffer.freeze()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons_testutils::multipart::MultipartBody;

    #[tokio::test]
    async fn small_parts_stay_in_memory() {
        let request = MultipartBody::new()
            .text("name", "alice")
            .file("doc", "a.txt", "text/plain", b"hello".as_slice())
            .into_request("/");
        let form = MultipartForm::parse(request, MAX_UPLOAD_MEMORY).await.unwrap();

        assert_eq!(form.values("name"), ["alice"]);
        let part = &form.files("doc")[0];
        assert!(!part.is_spilled());
        assert_eq!(part.file_name(), "a.txt");
        assert_eq!(part.declared_content_type(), Some("text/plain"));
        assert_eq!(part.read().await.unwrap().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn parts_over_budget_spill_to_disk() {
        let payload = vec![7u8; 64];
        let request = MultipartBody::new()
            .file("doc", "small.bin", "application/octet-stream", b"abc".as_slice())
            .file("doc", "big.bin", "application/octet-stream", payload.clone())
            .into_request("/");
        let form = MultipartForm::parse(request, 16).await.unwrap();

        let parts = form.files("doc");
        assert_eq!(parts.len(), 2);
        assert!(!parts[0].is_spilled());
        assert!(parts[1].is_spilled());
        assert_eq!(parts[1].read().await.unwrap().as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn text_over_budget_fails_the_parse() {
        let request = MultipartBody::new()
            .text("bio", "far too long for the budget")
            .into_request("/");
        let err = MultipartForm::parse(request, 8).await.err().unwrap();
        assert_eq!(err.to_string(), "multipart: message too large");
    }

    #[tokio::test]
    async fn absent_fields_are_empty() {
        let request = MultipartBody::new().text("a", "1").into_request("/");
        let form = MultipartForm::parse(request, MAX_UPLOAD_MEMORY).await.unwrap();
        assert!(form.values("b").is_empty());
        assert!(form.files("a").is_empty());
    }
}
