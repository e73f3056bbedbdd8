//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed storage file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("storage file {0} is already open in this process")]
    AlreadyOpen(PathBuf),
}
