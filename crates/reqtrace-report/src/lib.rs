//! reqtrace report
//!
//! Serializes an analyze run into:
//! - Forward, backward and per-category matrices (CSV)
//! - Coverage gap report (CSV)
//! - Narrative report (Markdown)
//! - Manifest with counts and output digests (JSON)
//!
//! Every output except the manifest timestamp is a pure function of the
//! corpus, so two runs over the same tree produce identical files.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod csv;
pub mod digest;
pub mod emitter;
pub mod error;
pub mod manifest;
pub mod narrative;

pub use digest::FileDigest;
pub use emitter::{
    write_missing_fields_csv, EmittedReport, ReportEmitter, BACKWARD_FILE, CATEGORY_DIR,
    FORWARD_FILE, GAP_FILE,
};
pub use error::{EmitError, EmitResult};
pub use manifest::{Manifest, ManifestCounts, OutputEntry, MANIFEST_FILE};
pub use narrative::{markdown_report, summary_text, REPORT_FILE};
