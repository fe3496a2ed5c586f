//! Run manifest
//!
//! JSON record of a run: when it happened, what was scanned, which patterns
//! classified the targets, the headline counts, and a SHA-256 for every file
//! written. The manifest does not list itself.

use crate::digest::FileDigest;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use reqtrace_core::AnalysisCounts;
use reqtrace_scan::PatternSource;
use serde::{Serialize, Serializer};

/// Manifest file name
pub const MANIFEST_FILE: &str = "traceability-manifest.json";

/// One emitted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    /// Path relative to the output directory, `/` separated
    pub path: String,
    /// Content digest
    pub sha256: FileDigest,
    /// Size in bytes
    pub bytes: usize,
}

/// Headline counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManifestCounts {
    /// Scan and graph counts
    #[serde(flatten)]
    pub analysis: AnalysisCounts,
    /// Distinct broken targets
    pub broken_targets: usize,
    /// Broken link occurrences
    pub broken_links: usize,
    /// Orphan records
    pub orphans: usize,
    /// Duplicate identifier declarations
    pub duplicates: usize,
    /// Records without artifact links
    pub coverage_gaps: usize,
}

/// Category selection recorded in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestCategories {
    /// Categories with a table
    pub included: Vec<String>,
    /// Categories excluded by the filter
    pub excluded: Vec<String>,
}

/// Run manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Generation time (UTC)
    #[serde(serialize_with = "rfc3339_seconds")]
    pub generated_at: DateTime<Utc>,
    /// Tool version
    pub tool_version: &'static str,
    /// Corpus root as given on the command line
    pub corpus_root: String,
    /// Evidence patterns in order
    pub evidence_patterns: Vec<String>,
    /// Where the patterns came from
    pub pattern_source: PatternSource,
    /// Counts
    pub counts: ManifestCounts,
    /// Category mode selection, if enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<ManifestCategories>,
    /// Emitted files by kind, in write order
    pub outputs: IndexMap<String, OutputEntry>,
}

impl Manifest {
    /// Record an emitted file
    pub fn record_output(&mut self, kind: impl Into<String>, path: impl Into<String>, content: &[u8]) {
        self.outputs.insert(
            kind.into(),
            OutputEntry {
                path: path.into(),
                sha256: FileDigest::compute(content),
                bytes: content.len(),
            },
        );
    }

    /// Pretty JSON with a trailing newline
    ///
    /// # Errors
    /// - `serde_json::Error` if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

fn rfc3339_seconds<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manifest() -> Manifest {
        Manifest {
            generated_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            tool_version: "0.1.0",
            corpus_root: "reqs".to_string(),
            evidence_patterns: vec!["test".to_string()],
            pattern_source: PatternSource::Default,
            counts: ManifestCounts::default(),
            categories: None,
            outputs: IndexMap::new(),
        }
    }

    #[test]
    fn serializes_timestamp_and_flattened_counts() {
        let value: serde_json::Value = serde_json::from_str(&manifest().to_json().unwrap()).unwrap();
        assert_eq!(value["generated_at"], "2026-10-18T09:30:00Z");
        assert_eq!(value["counts"]["files_scanned"], 0);
        assert_eq!(value["counts"]["links_extracted"], 0);
        assert_eq!(value["pattern_source"], "default");
        assert!(value.get("categories").is_none());
    }

    #[test]
    fn outputs_keep_write_order() {
        let mut m = manifest();
        m.record_output("forward", "traceability-matrix-forward.csv", b"a");
        m.record_output("backward", "traceability-matrix-backward.csv", b"b");
        let kinds: Vec<&str> = m.outputs.keys().map(String::as_str).collect();
        assert_eq!(kinds, vec!["forward", "backward"]);
        assert_eq!(m.outputs["forward"].bytes, 1);
    }
}
