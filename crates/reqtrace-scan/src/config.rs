//! Scan configuration

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Tooling configuration file excluded from every scan
pub const DOORSTOP_CONFIG: &str = ".doorstop.yml";

/// Directory name excluded by [`ScanConfig::with_ignore_templates`]
pub const TEMPLATES_DIR: &str = "templates";

/// Default maximum record size (bytes)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Corpus scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Worker threads, 0 = available parallelism
    pub jobs: usize,
    /// File extensions scanned (without the dot, matched case-insensitively)
    pub extensions: Vec<String>,
    /// File or directory names excluded wherever they appear
    pub excluded_names: Vec<String>,
    /// Files larger than this are read failures
    pub max_file_size: u64,
}

impl ScanConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With worker count (0 = available parallelism)
    #[inline]
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// With an additional excluded file or directory name
    #[must_use]
    pub fn with_excluded_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.excluded_names.contains(&name) {
            self.excluded_names.push(name);
        }
        self
    }

    /// Exclude `templates` directories
    #[must_use]
    pub fn with_ignore_templates(self, ignore: bool) -> Self {
        if ignore {
            self.with_excluded_name(TEMPLATES_DIR)
        } else {
            self
        }
    }

    /// With maximum file size
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Effective worker count
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.jobs > 0 {
            return self.jobs;
        }
        std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }

    /// Whether a file or directory name is excluded
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_names.iter().any(|n| n == name)
    }

    /// Whether a file extension is scanned
    #[must_use]
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            extensions: vec!["yml".to_string(), "yaml".to_string()],
            excluded_names: vec![DOORSTOP_CONFIG.to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScanConfig::default();
        assert!(config.is_excluded(".doorstop.yml"));
        assert!(!config.is_excluded("templates"));
        assert!(config.accepts_extension("YAML"));
        assert!(!config.accepts_extension("json"));
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn builders() {
        let config = ScanConfig::new()
            .with_jobs(3)
            .with_ignore_templates(true)
            .with_excluded_name("drafts")
            .with_excluded_name("drafts");
        assert_eq!(config.worker_count(), 3);
        assert!(config.is_excluded("templates"));
        assert_eq!(
            config.excluded_names,
            vec![".doorstop.yml", "templates", "drafts"]
        );
    }

    #[test]
    fn serializes_to_json() {
        let config = ScanConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
