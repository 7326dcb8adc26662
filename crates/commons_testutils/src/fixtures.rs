use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Unable to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads a JSON fixture into `T` and also returns its raw bytes, ready to be sent as
/// a request body.
pub fn file_to_struct<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<(T, Vec<u8>), FixtureError> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_slice(&raw).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((value, raw))
}

/// Deserializes a response body.
pub fn response_json<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(body)
}
