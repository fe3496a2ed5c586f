//! Narrative outputs
//!
//! - [`markdown_report`]: the `traceability-report.md` file
//! - [`summary_text`]: the plain-text count summary printed after every run
//!
//! Neither contains a timestamp, so both are byte-identical across runs over
//! the same corpus.

use reqtrace_core::{CategoryProjection, CoverageGap};
use reqtrace_scan::TraceRun;
use std::fmt::Write;

/// Narrative report file name
pub const REPORT_FILE: &str = "traceability-report.md";

/// Render the Markdown report
#[must_use]
pub fn markdown_report(
    run: &TraceRun,
    gaps: &[CoverageGap],
    categories: Option<&CategoryProjection>,
) -> String {
    let analysis = &run.analysis;
    let counts = &analysis.counts;
    let mut out = String::new();

    out.push_str("# Traceability Report\n\n");
    let _ = writeln!(out, "Corpus: `{}`\n", run.corpus_root.display());

    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Count |\n|---|---:|\n");
    for (label, value) in [
        ("Files scanned", counts.files_scanned),
        ("Records parsed", counts.records),
        ("Distinct identifiers", counts.nodes),
        ("Links extracted", counts.links_extracted),
        ("Read failures", counts.read_failures),
        ("Skipped (cancelled)", counts.skipped),
        ("Broken targets", analysis.broken_targets.len()),
        ("Orphan records", analysis.orphan_ids.len()),
        ("Duplicate identifiers", analysis.duplicates.len()),
        ("Coverage gaps", gaps.len()),
    ] {
        let _ = writeln!(out, "| {label} | {value} |");
    }
    out.push('\n');

    out.push_str("## Broken Links\n\n");
    if analysis.broken_links.is_empty() {
        out.push_str("None.\n\n");
    } else {
        out.push_str("| Target | Record | Link type | Location |\n|---|---|---|---|\n");
        for link in &analysis.broken_links {
            let _ = writeln!(
                out,
                "| `{}` | `{}` | {} | `{}` |",
                link.target, link.source, link.link_type, link.location
            );
        }
        out.push('\n');
    }

    out.push_str("## Orphan Records\n\n");
    bullet_list(&mut out, analysis.orphan_ids.iter().map(|id| format!("`{id}`")));

    out.push_str("## Duplicate Identifiers\n\n");
    bullet_list(
        &mut out,
        analysis
            .duplicates
            .iter()
            .map(|d| format!("`{}` in `{}` (first declared in `{}`)", d.id, d.duplicate, d.first)),
    );

    out.push_str("## Read Failures\n\n");
    bullet_list(
        &mut out,
        run.failures
            .iter()
            .map(|f| format!("`{}`: {}", f.location, f.error)),
    );

    if let Some(projection) = categories {
        out.push_str("## Categories\n\n");
        out.push_str("| Category | Records | Links | Table |\n|---|---:|---:|---|\n");
        for summary in &projection.summary {
            let table = if projection.tables.contains_key(&summary.category) {
                "yes"
            } else {
                "excluded"
            };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {table} |",
                summary.category, summary.records, summary.edges
            );
        }
        out.push('\n');
    }

    out.push_str("## Coverage Gaps\n\n");
    out.push_str("Records without any link to verification evidence.\n\n");
    bullet_list(
        &mut out,
        gaps.iter()
            .map(|g| format!("`{}` ({})", g.record_id, g.category)),
    );

    out
}

fn bullet_list(out: &mut String, items: impl Iterator<Item = String>) {
    let mut any = false;
    for item in items {
        let _ = writeln!(out, "- {item}");
        any = true;
    }
    if !any {
        out.push_str("None.\n");
    }
    out.push('\n');
}

/// Plain-text count summary
#[must_use]
pub fn summary_text(run: &TraceRun) -> String {
    let analysis = &run.analysis;
    let counts = &analysis.counts;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Scanned {} file(s): {} record(s), {} link(s), {} read failure(s)",
        counts.files_scanned, counts.records, counts.links_extracted, counts.read_failures
    );
    if counts.skipped > 0 {
        let _ = writeln!(out, "Cancelled: {} file(s) not scanned", counts.skipped);
    }
    let _ = writeln!(
        out,
        "Broken targets: {}  Orphans: {}  Duplicates: {}",
        analysis.broken_targets.len(),
        analysis.orphan_ids.len(),
        analysis.duplicates.len()
    );
    for target in &analysis.broken_targets {
        let _ = writeln!(out, "  broken: {target}");
    }
    for id in &analysis.orphan_ids {
        let _ = writeln!(out, "  orphan: {id}");
    }
    out
}
