//! Report emitter
//!
//! Writes every output of an analyze run into one directory:
//!
//! | File | Content |
//! |---|---|
//! | `traceability-matrix-forward.csv` | record → target rows |
//! | `traceability-matrix-backward.csv` | target → record rows |
//! | `by-category/<category>.csv` | forward rows per category (category mode) |
//! | `gap-report.csv` | records without artifact links |
//! | `traceability-report.md` | narrative report |
//! | `traceability-manifest.json` | counts, patterns, output digests |
//!
//! The manifest is written last so its digests cover everything else.

use crate::csv::{backward_csv, category_csv, forward_csv, gap_csv};
use crate::error::{EmitError, EmitResult};
use crate::manifest::{Manifest, ManifestCategories, ManifestCounts, MANIFEST_FILE};
use crate::narrative::{markdown_report, REPORT_FILE};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use reqtrace_core::{CategoryFilter, ConsistencyAnalyzer, MatrixProjector};
use reqtrace_scan::TraceRun;
use std::path::{Path, PathBuf};

/// Forward matrix file name
pub const FORWARD_FILE: &str = "traceability-matrix-forward.csv";
/// Backward matrix file name
pub const BACKWARD_FILE: &str = "traceability-matrix-backward.csv";
/// Gap report file name
pub const GAP_FILE: &str = "gap-report.csv";
/// Category table directory
pub const CATEGORY_DIR: &str = "by-category";

/// Files written by one emission
#[derive(Debug, Clone)]
pub struct EmittedReport {
    /// Output directory
    pub output_dir: PathBuf,
    /// Every file written, manifest last
    pub files: Vec<PathBuf>,
    /// The manifest as written
    pub manifest: Manifest,
}

impl EmittedReport {
    /// Manifest path
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE)
    }
}

/// Writes report files for a [`TraceRun`]
#[derive(Debug, Clone)]
pub struct ReportEmitter {
    output_dir: PathBuf,
    categories: Option<CategoryFilter>,
    generated_at: Option<DateTime<Utc>>,
}

impl ReportEmitter {
    /// Create emitter writing into `output_dir`
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            categories: None,
            generated_at: None,
        }
    }

    /// Enable category mode with a filter
    #[inline]
    #[must_use]
    pub fn with_categories(mut self, filter: CategoryFilter) -> Self {
        self.categories = Some(filter);
        self
    }

    /// Fix the manifest timestamp instead of using the current time
    #[inline]
    #[must_use]
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Output directory
    #[inline]
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all outputs
    ///
    /// # Errors
    /// - `EmitError::Core` if the category filter names unknown categories
    /// - `EmitError::CreateDir` / `EmitError::Write` if the output directory
    ///   is not writable
    /// - `EmitError::Manifest` if the manifest cannot be serialized
    pub fn emit(&self, run: &TraceRun) -> EmitResult<EmittedReport> {
        let projector = MatrixProjector::new();
        let projection = self
            .categories
            .as_ref()
            .map(|filter| projector.categories(&run.graph, filter))
            .transpose()?;
        let gaps = ConsistencyAnalyzer::new().coverage_gaps(&run.graph);

        self.create_dir(&self.output_dir)?;

        let analysis = &run.analysis;
        let mut manifest = Manifest {
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            tool_version: env!("CARGO_PKG_VERSION"),
            corpus_root: run.corpus_root.display().to_string(),
            evidence_patterns: run.patterns.patterns().to_vec(),
            pattern_source: run.patterns.source(),
            counts: ManifestCounts {
                analysis: analysis.counts,
                broken_targets: analysis.broken_targets.len(),
                broken_links: analysis.broken_links.len(),
                orphans: analysis.orphan_ids.len(),
                duplicates: analysis.duplicates.len(),
                coverage_gaps: gaps.len(),
            },
            categories: projection.as_ref().map(|p| ManifestCategories {
                included: p.tables.keys().cloned().collect(),
                excluded: p.excluded.clone(),
            }),
            outputs: IndexMap::new(),
        };
        let mut files = Vec::new();

        let forward = projector.forward(&run.graph);
        self.write(&mut manifest, &mut files, "forward", FORWARD_FILE, &forward_csv(&forward))?;

        let backward = projector.backward(&run.graph);
        self.write(&mut manifest, &mut files, "backward", BACKWARD_FILE, &backward_csv(&backward))?;

        if let Some(projection) = &projection {
            self.create_dir(&self.output_dir.join(CATEGORY_DIR))?;
            for (category, rows) in &projection.tables {
                let rel = format!("{CATEGORY_DIR}/{category}.csv");
                self.write(
                    &mut manifest,
                    &mut files,
                    format!("category:{category}"),
                    &rel,
                    &category_csv(rows),
                )?;
            }
        }

        self.write(&mut manifest, &mut files, "gap_report", GAP_FILE, &gap_csv(&gaps))?;

        let report = markdown_report(run, &gaps, projection.as_ref());
        self.write(&mut manifest, &mut files, "report", REPORT_FILE, &report)?;

        let manifest_path = self.output_dir.join(MANIFEST_FILE);
        write_file(&manifest_path, &manifest.to_json()?)?;
        files.push(manifest_path);

        tracing::info!(
            output = %self.output_dir.display(),
            files = files.len(),
            "reports written"
        );

        Ok(EmittedReport {
            output_dir: self.output_dir.clone(),
            files,
            manifest,
        })
    }

    fn create_dir(&self, path: &Path) -> EmitResult<()> {
        std::fs::create_dir_all(path).map_err(|source| EmitError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(
        &self,
        manifest: &mut Manifest,
        files: &mut Vec<PathBuf>,
        kind: impl Into<String>,
        rel: &str,
        content: &str,
    ) -> EmitResult<()> {
        let path = self.output_dir.join(rel);
        write_file(&path, content)?;
        manifest.record_output(kind, rel, content.as_bytes());
        files.push(path);
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> EmitResult<()> {
    std::fs::write(path, content).map_err(|e| EmitError::write_error(path, e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

/// Write the missing-fields CSV of a lint run
///
/// # Errors
/// - `EmitError::CreateDir` / `EmitError::Write` if the file cannot be written
pub fn write_missing_fields_csv(path: &Path, report: &reqtrace_scan::LintReport) -> EmitResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_file(path, &crate::csv::missing_fields_csv(report.missing_fields_rows()))
}
