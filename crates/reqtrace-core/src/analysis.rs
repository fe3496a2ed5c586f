//! Consistency analysis over a built graph
//!
//! Findings are data, not errors: the analyzer never mutates the graph and
//! never aborts. Whether findings fail a run is decided by the caller through
//! [`AnalysisResult::verdict`].

use crate::graph::{DuplicateRecord, Graph};
use crate::types::{LinkType, RecordId, ScanTally, SourceLocation, TargetClass};
use serde::Serialize;
use std::collections::BTreeSet;

/// Counts reported with every analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisCounts {
    /// Record files discovered by the scan
    pub files_scanned: usize,
    /// Files that could not be read
    pub read_failures: usize,
    /// Files skipped after cancellation
    pub skipped: usize,
    /// Record files parsed into the graph
    pub records: usize,
    /// Distinct record identifiers
    pub nodes: usize,
    /// Edges extracted
    pub links_extracted: usize,
}

/// One occurrence of a link to an undefined record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// Declaring record
    pub source: RecordId,
    /// Undefined target
    pub target: String,
    /// Key the link was declared under
    pub link_type: LinkType,
    /// Declaring file
    pub location: SourceLocation,
}

/// Record without evidence links
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageGap {
    /// Record identifier
    pub record_id: RecordId,
    /// Category of the first declaring file
    pub category: String,
    /// Kind of link that is missing
    pub missing_links: &'static str,
}

/// Outcome of a run given its findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// No broken links, no orphans
    Pass,
    /// Findings exist but strict mode is off
    Findings,
    /// Findings exist and strict mode is on
    Fail,
}

impl Verdict {
    /// Process exit code for this verdict
    #[inline]
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Pass | Self::Findings => 0,
            Self::Fail => 3,
        }
    }
}

/// Result of [`ConsistencyAnalyzer::analyze`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Distinct requirement-ref targets that are not record identifiers
    pub broken_targets: BTreeSet<String>,
    /// Records with no edges in either direction
    pub orphan_ids: BTreeSet<RecordId>,
    /// Every edge pointing at a broken target, in edge order
    pub broken_links: Vec<BrokenLink>,
    /// Identifiers declared by more than one file
    pub duplicates: Vec<DuplicateRecord>,
    /// Counts
    pub counts: AnalysisCounts,
}

impl AnalysisResult {
    /// Whether broken links or orphans were found
    ///
    /// Duplicates and coverage gaps are reported but do not count.
    #[inline]
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.broken_targets.is_empty() || !self.orphan_ids.is_empty()
    }

    /// Verdict under the given strictness
    #[must_use]
    pub fn verdict(&self, strict: bool) -> Verdict {
        match (self.has_findings(), strict) {
            (false, _) => Verdict::Pass,
            (true, false) => Verdict::Findings,
            (true, true) => Verdict::Fail,
        }
    }
}

/// Broken link and orphan detection
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyAnalyzer;

impl ConsistencyAnalyzer {
    /// Create new analyzer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Analyze a graph
    ///
    /// `tally` carries the scan-level counts the graph cannot know about.
    #[must_use]
    pub fn analyze(&self, graph: &Graph, tally: ScanTally) -> AnalysisResult {
        let broken_links: Vec<BrokenLink> = graph
            .edges()
            .iter()
            .filter(|e| e.class == TargetClass::RequirementRef)
            .filter(|e| !graph.contains_node(&e.edge.target))
            .map(|e| BrokenLink {
                source: e.edge.source.clone(),
                target: e.edge.target.clone(),
                link_type: e.edge.link_type,
                location: e.edge.location.clone(),
            })
            .collect();

        let broken_targets: BTreeSet<String> =
            broken_links.iter().map(|l| l.target.clone()).collect();

        let orphan_ids: BTreeSet<RecordId> = graph
            .node_ids()
            .filter(|id| graph.is_isolated(id.as_str()))
            .cloned()
            .collect();

        let counts = AnalysisCounts {
            files_scanned: tally.discovered,
            read_failures: tally.failed,
            skipped: tally.skipped,
            records: graph.records().len(),
            nodes: graph.node_count(),
            links_extracted: graph.edges().len(),
        };

        tracing::info!(
            files = counts.files_scanned,
            links = counts.links_extracted,
            broken = broken_targets.len(),
            orphans = orphan_ids.len(),
            "analysis complete"
        );

        AnalysisResult {
            broken_targets,
            orphan_ids,
            broken_links,
            duplicates: graph.duplicates().to_vec(),
            counts,
        }
    }

    /// Records without any artifact-ref edge, in first-seen order
    #[must_use]
    pub fn coverage_gaps(&self, graph: &Graph) -> Vec<CoverageGap> {
        graph
            .node_ids()
            .filter(|id| {
                !graph
                    .outgoing(id.as_str())
                    .iter()
                    .any(|e| e.class == TargetClass::ArtifactRef)
            })
            .map(|id| CoverageGap {
                record_id: id.clone(),
                category: graph
                    .node(id.as_str())
                    .map_or_else(String::new, |n| n.location.category().to_string()),
                missing_links: "artifact",
            })
            .collect()
    }
}
