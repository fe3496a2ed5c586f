//! Corpus discovery
//!
//! Walks the corpus root, prunes excluded names, and returns record files
//! sorted by path. Sorting here is what makes every later stage
//! deterministic.

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use reqtrace_core::SourceLocation;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One discovered record file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CorpusFile {
    /// Absolute or caller-relative path used for reading
    pub path: PathBuf,
    /// Location relative to the corpus root
    pub location: SourceLocation,
}

/// Sorted record files under a corpus root
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<CorpusFile>,
    walk_errors: usize,
}

impl Corpus {
    /// Discover record files
    ///
    /// Unreadable directory entries are logged and skipped.
    ///
    /// # Errors
    /// - `ScanError::CorpusNotFound` if `root` does not exist
    /// - `ScanError::NotADirectory` if `root` is not a directory
    pub fn discover(root: impl AsRef<Path>, config: &ScanConfig) -> ScanResult<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(ScanError::CorpusNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let mut walk_errors = 0;

        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !config.is_excluded(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    walk_errors += 1;
                    tracing::warn!(error = %err, "skipping unreadable corpus entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let accepted = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| config.accepts_extension(e));
            if !accepted {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            files.push(CorpusFile {
                path: entry.path().to_path_buf(),
                location: SourceLocation::from_relative_path(relative),
            });
        }

        files.sort_by(|a, b| a.location.cmp(&b.location));

        tracing::debug!(
            root = %root.display(),
            files = files.len(),
            walk_errors,
            "corpus discovered"
        );

        Ok(Self {
            root: root.to_path_buf(),
            files,
            walk_errors,
        })
    }

    /// Corpus root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discovered files in sorted order
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    /// Number of discovered files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no record files were found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Directory entries that could not be read during the walk
    #[inline]
    #[must_use]
    pub fn walk_errors(&self) -> usize {
        self.walk_errors
    }
}
