//! Model loading and scoring errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{what}: expected {expected} values, found {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported kernel '{0}' (only rbf is supported)")]
    UnsupportedKernel(String),
    #[error("{0} is empty")]
    Empty(&'static str),
    #[error("gesture {gesture_id}: {source}")]
    Row {
        gesture_id: u32,
        #[source]
        source: Box<ModelError>,
    },
}

/// Read a JSON artifact from disk.
pub(crate) fn read_artifact(path: &std::path::Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON artifact to disk.
pub(crate) fn write_artifact(path: &std::path::Path, json: &str) -> Result<(), ModelError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ModelError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, json).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}
