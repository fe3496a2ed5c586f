//! Error types for corpus scanning
//!
//! Provides error handling for:
//! - Record reads (one file, isolated)
//! - Corpus scans (boundary failures that abort a run)
//! - Pattern configuration (downgraded to defaults by callers)
//! - Structured record documents (reported by the linter)

use reqtrace_core::CoreError;
use std::path::PathBuf;

/// Errors reading one record file
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("file too large: {path} is {size} bytes (max: {limit})")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// File content is not valid UTF-8
    #[error("invalid utf-8 in {path}: {source}")]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl ReadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path of the file that failed
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::TooLarge { path, .. } | Self::NotUtf8 { path, .. } => {
                path
            }
        }
    }
}

/// Errors that abort a scan
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Corpus root does not exist
    #[error("corpus directory not found: {0}")]
    CorpusNotFound(PathBuf),

    /// Corpus root is not a directory
    #[error("corpus path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Worker pool could not be created
    #[error("worker pool: {0}")]
    WorkerPool(String),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Errors loading pattern configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during config read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON of the expected shape
    #[error("invalid pattern file {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors building a structured record document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// YAML syntax error
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document is empty or null
    #[error("empty yaml document")]
    Empty,
}

/// Result type alias for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display() {
        let err = ReadError::TooLarge {
            path: PathBuf::from("swd/SWD-1.yml"),
            size: 20,
            limit: 10,
        };
        assert_eq!(
            err.to_string(),
            "file too large: swd/SWD-1.yml is 20 bytes (max: 10)"
        );
        assert_eq!(err.path(), std::path::Path::new("swd/SWD-1.yml"));
    }

    #[test]
    fn scan_error_display() {
        let err = ScanError::CorpusNotFound(PathBuf::from("reqs"));
        assert_eq!(err.to_string(), "corpus directory not found: reqs");
    }

    #[test]
    fn core_error_conversion() {
        let err: ScanError = CoreError::UnknownCategory(vec!["hw".into()]).into();
        assert!(matches!(err, ScanError::Core(_)));
    }
}
