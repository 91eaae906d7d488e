//! Errors for project analysis and `quality.yml` generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning a project or writing its configuration.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("{path} already exists (use --force to overwrite)")]
    ConfigExists { path: PathBuf },

    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for init operations.
pub type Result<T> = std::result::Result<T, InitError>;
