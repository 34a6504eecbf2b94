use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures that abort an update check. A partial sync is not one of these:
/// per-file wipe/copy failures are collected into the `SyncOutcome` instead.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("mod archive not found upstream: {url}")]
    NotFound { url: String },

    #[error("fetching {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("archive {path:?} has no usable payload: {reason}")]
    ArchiveFormat { path: PathBuf, reason: String },

    #[error("filesystem error at {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UpdateError {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        UpdateError::FileSystem {
            path: path.into(),
            source,
        }
    }
}
