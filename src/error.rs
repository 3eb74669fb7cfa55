use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for path resolution, CSV parsing, schema inspection and store writes.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{kind} not found: {}", path.display())]
    InputNotFound { kind: &'static str, path: PathBuf },
    #[error("CSV file and database resolve to the same path: {}", .0.display())]
    SamePath(PathBuf),
    #[error("CSV missing headers: {0:?}")]
    Header(Vec<String>),
    #[error("schema error: {0}")]
    Schema(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
