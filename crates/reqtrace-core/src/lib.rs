//! reqtrace core
//!
//! The traceability graph extractor and analyzer:
//!
//! - **Parse**: tolerant line scan of a requirement record into a
//!   [`RecordId`] and its outbound [`LinkEdge`]s
//! - **Classify**: decide whether a link target is another record or an
//!   external evidence artifact
//! - **Build**: aggregate parsed records into an immutable [`Graph`]
//! - **Project**: forward, backward and per-category matrices
//! - **Analyze**: broken links, orphans and coverage gaps
//!
//! # Architecture
//!
//! ```text
//! text → RecordParser → ParsedRecord ─┐
//! text → RecordParser → ParsedRecord ─┼→ GraphBuilder → Graph ─┬→ MatrixProjector
//! text → RecordParser → ParsedRecord ─┘   (TargetClassifier)   └→ ConsistencyAnalyzer
//! ```
//!
//! # Example
//!
//! ```rust
//! use reqtrace_core::prelude::*;
//!
//! let parser = RecordParser::new();
//! let urd = parser.parse("URD-1:\n  text: root\n", &SourceLocation::new("urd/URD-1.yml"));
//! let srd = parser.parse("SRD-1:\n  links: [URD-1]\n", &SourceLocation::new("srd/SRD-1.yml"));
//!
//! let graph = GraphBuilder::new(TargetClassifier::default()).build(vec![urd, srd]);
//! let analysis = ConsistencyAnalyzer::new().analyze(&graph, ScanTally::from_records(2));
//!
//! assert!(analysis.broken_targets.is_empty());
//! assert!(analysis.orphan_ids.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod analysis;
pub mod classify;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod parser;
pub mod types;

pub use analysis::{
    AnalysisCounts, AnalysisResult, BrokenLink, ConsistencyAnalyzer, CoverageGap, Verdict,
};
pub use classify::{KnownIds, TargetClassifier, DEFAULT_EVIDENCE_PATTERNS};
pub use error::{CoreError, CoreResult};
pub use graph::{ClassifiedEdge, DuplicateRecord, Graph, GraphBuilder, RecordNode};
pub use matrix::{
    BackwardMatrix, CategoryFilter, CategoryProjection, CategorySummary, ForwardMatrix,
    MatrixProjector, MatrixRow,
};
pub use parser::RecordParser;
pub use types::{
    IdSource, LinkEdge, LinkType, ParsedRecord, RecordId, ScanTally, SourceLocation,
    TargetClass, ROOT_CATEGORY,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the traceability core
    pub use crate::analysis::{AnalysisResult, ConsistencyAnalyzer, Verdict};
    pub use crate::classify::{KnownIds, TargetClassifier};
    pub use crate::graph::{Graph, GraphBuilder};
    pub use crate::matrix::{CategoryFilter, MatrixProjector};
    pub use crate::parser::RecordParser;
    pub use crate::types::{
        LinkEdge, LinkType, ParsedRecord, RecordId, ScanTally, SourceLocation, TargetClass,
    };
}
