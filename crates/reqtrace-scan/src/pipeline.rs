//! Scan pipelines
//!
//! Wires discovery, the worker pool and the core passes together:
//!
//! ```text
//! Corpus::discover → Scanner ─┬→ GraphBuilder → ConsistencyAnalyzer   (analyze)
//!                             └→ RecordLinter (+ graph checks)         (lint)
//! ```

use crate::config::ScanConfig;
use crate::corpus::Corpus;
use crate::error::ScanResult;
use crate::lint::{broken_link_findings, duplicate_findings, FileLint, LintFinding, RecordLinter, Severity};
use crate::patterns::PatternSet;
use crate::scanner::{CancelToken, ReadFailure, Scanner};
use reqtrace_core::{
    AnalysisResult, ConsistencyAnalyzer, Graph, GraphBuilder, ScanTally, SourceLocation,
};
use std::path::{Path, PathBuf};

/// Result of an analyze run
#[derive(Debug)]
pub struct TraceRun {
    /// Corpus root as given
    pub corpus_root: PathBuf,
    /// Built graph
    pub graph: Graph,
    /// Analysis of the graph
    pub analysis: AnalysisResult,
    /// Files that could not be read
    pub failures: Vec<ReadFailure>,
    /// Files skipped after cancellation
    pub skipped: Vec<SourceLocation>,
    /// Patterns used for classification
    pub patterns: PatternSet,
}

/// Result of a lint run
#[derive(Debug)]
pub struct LintReport {
    /// Per-file results in corpus order
    pub files: Vec<FileLint>,
    /// Graph-level findings (broken links, duplicates)
    pub corpus_findings: Vec<LintFinding>,
    /// Files that could not be read
    pub failures: Vec<ReadFailure>,
    /// File counts
    pub tally: ScanTally,
}

impl LintReport {
    /// All findings: per-file first, then graph-level
    pub fn findings(&self) -> impl Iterator<Item = &LintFinding> {
        self.files
            .iter()
            .flat_map(|f| f.findings.iter())
            .chain(&self.corpus_findings)
    }

    /// Error findings plus read failures
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.findings()
            .filter(|f| f.severity() == Severity::Error)
            .count()
            + self.failures.len()
    }

    /// Warning findings
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.findings()
            .filter(|f| f.severity() == Severity::Warning)
            .count()
    }

    /// Whether the lint fails
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// `(location, missing fields)` for every linted file
    pub fn missing_fields_rows(&self) -> impl Iterator<Item = (&SourceLocation, &[String])> {
        self.files
            .iter()
            .map(|f| (&f.location, f.missing_fields.as_slice()))
    }
}

/// Configured scan pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: ScanConfig,
    patterns: PatternSet,
    cancel: CancelToken,
}

impl Pipeline {
    /// Create pipeline with default patterns
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// With evidence patterns
    #[inline]
    #[must_use]
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    /// With an externally owned cancel token
    #[inline]
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Scan configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn scanner(&self) -> Scanner {
        Scanner::new(&self.config).with_cancel_token(self.cancel.clone())
    }

    /// Scan, build the graph and analyze it
    ///
    /// # Errors
    /// - `ScanError::CorpusNotFound` / `ScanError::NotADirectory` for a bad root
    /// - `ScanError::WorkerPool` if the thread pool cannot be built
    pub fn analyze(&self, root: &Path) -> ScanResult<TraceRun> {
        let corpus = Corpus::discover(root, &self.config)?;
        let outcome = self.scanner().scan_records(&corpus)?;
        let tally = outcome.tally();

        let graph = GraphBuilder::new(self.patterns.classifier()).build(outcome.items);
        let analysis = ConsistencyAnalyzer::new().analyze(&graph, tally);

        Ok(TraceRun {
            corpus_root: root.to_path_buf(),
            graph,
            analysis,
            failures: outcome.failures,
            skipped: outcome.skipped,
            patterns: self.patterns.clone(),
        })
    }

    /// Lint every record
    ///
    /// With `check_links`, the graph is built from the same reads and broken
    /// links and duplicate identifiers are added as corpus findings.
    ///
    /// # Errors
    /// - `ScanError::CorpusNotFound` / `ScanError::NotADirectory` for a bad root
    /// - `ScanError::WorkerPool` if the thread pool cannot be built
    pub fn lint(&self, root: &Path, check_links: bool) -> ScanResult<LintReport> {
        let corpus = Corpus::discover(root, &self.config)?;
        let linter = RecordLinter::new();
        let parser = reqtrace_core::RecordParser::new();

        let outcome = self.scanner().scan_with(&corpus, |file, text| {
            let lint = linter.lint(text, &file.location);
            let record = check_links.then(|| parser.parse(text, &file.location));
            (lint, record)
        })?;
        let tally = outcome.tally();

        let (files, records): (Vec<FileLint>, Vec<_>) = outcome.items.into_iter().unzip();

        let mut corpus_findings = Vec::new();
        if check_links {
            let records = records.into_iter().flatten().collect();
            let graph = GraphBuilder::new(self.patterns.classifier()).build(records);
            let analysis = ConsistencyAnalyzer::new().analyze(&graph, tally);
            corpus_findings.extend(broken_link_findings(&analysis));
            corpus_findings.extend(duplicate_findings(&graph));
        }

        let report = LintReport {
            files,
            corpus_findings,
            failures: outcome.failures,
            tally,
        };
        tracing::info!(
            files = report.files.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "lint complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqtrace_core::RecordId;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn analyze_runs_every_stage() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "urd/URD-1.yml", "URD-1:\n  text: x\n");
        write(dir.path(), "srd/SRD-1.yml", "SRD-1:\n  links: [URD-1, URD-9]\n");
        write(dir.path(), "srd/SRD-2.yml", "SRD-2:\n  text: alone\n");

        let run = Pipeline::new(ScanConfig::default().with_jobs(2))
            .analyze(dir.path())
            .unwrap();
        assert_eq!(run.graph.records().len(), 3);
        assert!(run.analysis.broken_targets.contains("URD-9"));
        assert!(run.analysis.orphan_ids.contains(&RecordId::new("SRD-2")));
        assert_eq!(run.analysis.counts.files_scanned, 3);
    }

    #[test]
    fn custom_patterns_change_classification() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "srd/SRD-1.yml", "SRD-1:\n  links: [HIL-RUN-7]\n");

        let default = Pipeline::new(ScanConfig::default()).analyze(dir.path()).unwrap();
        assert!(default.analysis.broken_targets.contains("HIL-RUN-7"));

        let custom = Pipeline::new(ScanConfig::default())
            .with_patterns(PatternSet::new(["hil-"]))
            .analyze(dir.path())
            .unwrap();
        assert!(custom.analysis.broken_targets.is_empty());
    }

    #[test]
    fn lint_with_link_check() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "swd/SWD-1.yml",
            "SWD-1:\n  header: h\n  text: t\n  links: [SRD-404]\n",
        );
        write(dir.path(), "swd/SWD-1-copy.yml", "SWD-1:\n");

        let pipeline = Pipeline::new(ScanConfig::default());
        let without = pipeline.lint(dir.path(), false).unwrap();
        assert!(without.corpus_findings.is_empty());

        let with = pipeline.lint(dir.path(), true).unwrap();
        let rules: Vec<&str> = with
            .corpus_findings
            .iter()
            .map(|f| f.rule.rule_id())
            .collect();
        assert_eq!(rules, vec!["broken-link", "duplicate-id"]);
        assert!(with.has_errors());
        assert_eq!(with.missing_fields_rows().count(), 2);
    }
}
