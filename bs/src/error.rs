//! Store errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error for {collection}/{id}: {source}")]
    Serde {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Store at {0} is locked by another process")]
    Locked(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
