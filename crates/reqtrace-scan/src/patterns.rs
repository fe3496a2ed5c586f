//! Evidence pattern configuration
//!
//! Patterns are read from a JSON file in one of two shapes:
//!
//! ```json
//! {"evidence_patterns": ["junit", "coverage"]}
//! ```
//!
//! ```json
//! ["junit", "coverage"]
//! ```
//!
//! A missing or malformed file never fails a run: [`PatternSet::load_or_default`]
//! logs a warning and falls back to the default list.

use crate::error::ConfigError;
use reqtrace_core::{TargetClassifier, DEFAULT_EVIDENCE_PATTERNS};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternFile {
    Object { evidence_patterns: Vec<String> },
    List(Vec<String>),
}

/// Where a pattern set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternSource {
    /// Built-in defaults
    Default,
    /// Loaded from a file
    File,
    /// File was given but unusable; defaults used
    Fallback,
}

/// Ordered evidence patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSet {
    patterns: Vec<String>,
    source: PatternSource,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_EVIDENCE_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
            source: PatternSource::Default,
        }
    }
}

impl PatternSet {
    /// Create from an explicit list
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            source: PatternSource::File,
        }
    }

    /// Parse pattern JSON
    ///
    /// # Errors
    /// - `serde_json::Error` if the text is neither accepted shape
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: PatternFile = serde_json::from_str(text)?;
        let patterns = match file {
            PatternFile::Object { evidence_patterns } => evidence_patterns,
            PatternFile::List(list) => list,
        };
        Ok(Self::new(patterns))
    }

    /// Load pattern file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::InvalidJson` if it has the wrong shape
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_json(&text).map_err(|source| ConfigError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load pattern file, or defaults with a warning
    #[must_use]
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(set) => {
                tracing::info!(path = %path.display(), patterns = set.len(), "loaded evidence patterns");
                set
            }
            Err(err) => {
                tracing::warn!(error = %err, "using default evidence patterns");
                Self {
                    source: PatternSource::Fallback,
                    ..Self::default()
                }
            }
        }
    }

    /// Patterns in order
    #[inline]
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Where the patterns came from
    #[inline]
    #[must_use]
    pub fn source(&self) -> PatternSource {
        self.source
    }

    /// Number of patterns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Classifier using these patterns
    #[must_use]
    pub fn classifier(&self) -> TargetClassifier {
        TargetClassifier::new(&self.patterns)
    }
}
