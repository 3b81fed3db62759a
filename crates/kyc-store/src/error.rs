//! Proof store errors.

use std::path::PathBuf;

use thiserror::Error;

/// A storage failure. Never swallowed: every variant reaches the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("proof store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("proof store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("proof store database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("proof store migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid proof key {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
