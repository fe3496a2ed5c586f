//! reqtrace scan
//!
//! Filesystem side of the traceability pipeline:
//! - Corpus discovery with extension and name exclusions
//! - Parallel record reads on a fixed-size worker pool
//! - Evidence pattern configuration
//! - Record lint (format, schema and link diagnostics)
//!
//! # Example
//!
//! ```rust,no_run
//! use reqtrace_scan::{Pipeline, ScanConfig};
//! use std::path::Path;
//!
//! let run = Pipeline::new(ScanConfig::default().with_ignore_templates(true))
//!     .analyze(Path::new("reqs"))?;
//! println!("{} links", run.analysis.counts.links_extracted);
//! # Ok::<(), reqtrace_scan::ScanError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod lint;
pub mod patterns;
pub mod pipeline;
pub mod reader;
pub mod scanner;

pub use config::ScanConfig;
pub use corpus::{Corpus, CorpusFile};
pub use document::RecordDocument;
pub use error::{ConfigError, DocumentError, ReadError, ScanError, ScanResult};
pub use lint::{FileLint, LintFinding, LintRule, RecordLinter, Severity};
pub use patterns::{PatternSet, PatternSource};
pub use pipeline::{LintReport, Pipeline, TraceRun};
pub use reader::RecordReader;
pub use scanner::{CancelToken, ReadFailure, ScanOutcome, Scanner};
