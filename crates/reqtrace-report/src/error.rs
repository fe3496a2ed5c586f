//! Error types for report emission
//!
//! Any of these aborts the run: a report that cannot be written completely
//! must not look like a successful one.

use reqtrace_core::CoreError;
use std::path::PathBuf;

/// Errors during report emission
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Output directory could not be created
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("io error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest serialization failed
    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Projection failed (e.g. unknown category in filter)
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EmitError {
    /// Create write error for path
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for emit operations
pub type EmitResult<T> = Result<T, EmitError>;
