//! Record lint
//!
//! Per-file format and schema diagnostics plus corpus-wide checks that need
//! the graph. Findings are reported, never enforced: a file with errors is
//! still scanned and still contributes its links.

use crate::document::{RecordDocument, REQUIRED_FIELDS};
use once_cell::sync::Lazy;
use regex::Regex;
use reqtrace_core::{AnalysisResult, Graph, SourceLocation};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Keys every record is expected to contain
pub const EXPECTED_KEYS: &[&str] = &["header:", "text:", "reviewers:", "reviewed:", "ref:"];

static TOP_LEVEL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_\-]+):\s*$").expect("static regex"));

static REF_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*ref:\s*["']?([A-Za-z0-9_\-]+)["']?\s*$"#).expect("static regex")
});

static REVIEWED_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*reviewed\s*:\s*["']?([A-Za-z0-9_\-]*)["']?\s*$"#).expect("static regex")
});

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, does not fail the lint
    Warning,
    /// Fails the lint
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Lint rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintRule {
    /// Markdown code fence left in the record
    CodeFence,
    /// No non-blank lines
    EmptyFile,
    /// First non-blank line is not `<ID>:`
    MissingIdMapping,
    /// Expected key absent
    MissingKey,
    /// Top-level identifier differs from the filename stem
    IdMismatch,
    /// `ref:` value differs from the filename stem
    RefMismatch,
    /// `ref:` present but its value is not a token
    RefUnparsable,
    /// `reviewers:` without list items
    ReviewersNoItems,
    /// `reviewers:` without any `name:`
    ReviewersNoName,
    /// Structured YAML parse failed
    InvalidYaml,
    /// Required fields absent or empty
    MissingFields,
    /// `reviewed:` empty or null
    Unreviewed,
    /// Requirement link to an undefined record
    BrokenLink,
    /// Identifier declared by several files
    DuplicateId,
}

impl LintRule {
    /// Stable rule identifier
    #[must_use]
    pub const fn rule_id(self) -> &'static str {
        match self {
            Self::CodeFence => "code-fence",
            Self::EmptyFile => "empty-file",
            Self::MissingIdMapping => "missing-id-mapping",
            Self::MissingKey => "missing-key",
            Self::IdMismatch => "id-mismatch",
            Self::RefMismatch => "ref-mismatch",
            Self::RefUnparsable => "ref-unparsable",
            Self::ReviewersNoItems => "reviewers-no-items",
            Self::ReviewersNoName => "reviewers-no-name",
            Self::InvalidYaml => "invalid-yaml",
            Self::MissingFields => "missing-fields",
            Self::Unreviewed => "unreviewed",
            Self::BrokenLink => "broken-link",
            Self::DuplicateId => "duplicate-id",
        }
    }

    /// Severity of findings under this rule
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::InvalidYaml | Self::MissingFields | Self::Unreviewed | Self::DuplicateId => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

/// One lint finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    /// File the finding is about
    pub location: SourceLocation,
    /// Rule that fired
    pub rule: LintRule,
    /// Human-readable message
    pub message: String,
}

impl LintFinding {
    fn new(location: &SourceLocation, rule: LintRule, message: impl Into<String>) -> Self {
        Self {
            location: location.clone(),
            rule,
            message: message.into(),
        }
    }

    /// Severity
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.rule.severity()
    }
}

impl Display for LintFinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity(),
            self.rule.rule_id(),
            self.location,
            self.message
        )
    }
}

/// Lint result for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLint {
    /// Linted file
    pub location: SourceLocation,
    /// Findings in rule order
    pub findings: Vec<LintFinding>,
    /// Required fields absent or empty
    pub missing_fields: Vec<String>,
}

/// Per-file record linter
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLinter;

impl RecordLinter {
    /// Create new linter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Lint one record's text
    #[must_use]
    pub fn lint(&self, text: &str, location: &SourceLocation) -> FileLint {
        let stem = location.file_stem();
        let mut findings = Vec::new();

        if text.contains("```") {
            findings.push(LintFinding::new(
                location,
                LintRule::CodeFence,
                "contains markdown code fence (```)",
            ));
        }

        let Some(first) = text.lines().find(|l| !l.trim().is_empty()) else {
            findings.push(LintFinding::new(location, LintRule::EmptyFile, "file is empty"));
            return FileLint {
                location: location.clone(),
                findings,
                missing_fields: REQUIRED_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            };
        };

        let top_id = TOP_LEVEL_ID
            .captures(first.trim_end())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        if top_id.is_none() {
            findings.push(LintFinding::new(
                location,
                LintRule::MissingIdMapping,
                "first non-empty line is not a top-level ID mapping (e.g. \"SWD-001:\")",
            ));
        }

        for key in EXPECTED_KEYS {
            if !text.contains(key) {
                findings.push(LintFinding::new(
                    location,
                    LintRule::MissingKey,
                    format!("missing expected key `{key}`"),
                ));
            }
        }

        if let Some(id) = top_id.filter(|id| *id != stem) {
            findings.push(LintFinding::new(
                location,
                LintRule::IdMismatch,
                format!("top-level ID `{id}` does not match filename `{stem}`"),
            ));
        }

        check_ref(text, stem, location, &mut findings);
        check_reviewers(text, location, &mut findings);

        let missing_fields: Vec<String> = match RecordDocument::parse(text) {
            Ok(doc) => doc
                .missing_fields(stem, REQUIRED_FIELDS)
                .into_iter()
                .map(str::to_string)
                .collect(),
            Err(err) => {
                findings.push(LintFinding::new(
                    location,
                    LintRule::InvalidYaml,
                    format!("structured parse failed: {err}"),
                ));
                REQUIRED_FIELDS.iter().map(|f| (*f).to_string()).collect()
            }
        };
        if !missing_fields.is_empty() {
            findings.push(LintFinding::new(
                location,
                LintRule::MissingFields,
                format!("missing or empty fields: {}", missing_fields.join("; ")),
            ));
        }

        let unreviewed = text
            .lines()
            .find_map(|l| REVIEWED_VALUE.captures(l))
            .and_then(|c| c.get(1))
            .is_some_and(|m| matches!(m.as_str(), "" | "null"));
        if unreviewed {
            findings.push(LintFinding::new(
                location,
                LintRule::Unreviewed,
                "`reviewed:` is empty; record is not baselined",
            ));
        }

        tracing::debug!(location = %location, findings = findings.len(), "linted record");

        FileLint {
            location: location.clone(),
            findings,
            missing_fields,
        }
    }
}

fn check_ref(text: &str, stem: &str, location: &SourceLocation, findings: &mut Vec<LintFinding>) {
    let value = text
        .lines()
        .find_map(|l| REF_VALUE.captures(l))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    match value {
        Some(value) if value != stem => findings.push(LintFinding::new(
            location,
            LintRule::RefMismatch,
            format!("`ref:` value `{value}` does not match filename `{stem}`"),
        )),
        Some(_) => {}
        None if text.contains("ref:") => findings.push(LintFinding::new(
            location,
            LintRule::RefUnparsable,
            "could not parse `ref:` value",
        )),
        None => {}
    }
}

fn check_reviewers(text: &str, location: &SourceLocation, findings: &mut Vec<LintFinding>) {
    let lines: Vec<&str> = text.lines().collect();
    let Some(start) = lines
        .iter()
        .position(|l| l.trim().starts_with("reviewers:"))
    else {
        return;
    };

    let mut found_item = false;
    let mut found_name = false;
    for line in &lines[start + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with([' ', '\t', '-']) {
            break;
        }
        found_item |= line.trim_start().starts_with('-');
        found_name |= line.contains("name:");
    }

    if !found_item {
        findings.push(LintFinding::new(
            location,
            LintRule::ReviewersNoItems,
            "`reviewers:` present but no list items found (expect `- name:` entries)",
        ));
    }
    if !found_name {
        findings.push(LintFinding::new(
            location,
            LintRule::ReviewersNoName,
            "no `name:` found under `reviewers:` entries",
        ));
    }
}

/// One error per occurrence of a link to an undefined record
#[must_use]
pub fn broken_link_findings(analysis: &AnalysisResult) -> Vec<LintFinding> {
    analysis
        .broken_links
        .iter()
        .map(|l| {
            LintFinding::new(
                &l.location,
                LintRule::BrokenLink,
                format!("`{}` links to undefined record `{}` ({})", l.source, l.target, l.link_type),
            )
        })
        .collect()
}

/// One warning per file re-declaring an identifier
#[must_use]
pub fn duplicate_findings(graph: &Graph) -> Vec<LintFinding> {
    graph
        .duplicates()
        .iter()
        .map(|d| {
            LintFinding::new(
                &d.duplicate,
                LintRule::DuplicateId,
                format!("identifier `{}` already declared in {}", d.id, d.first),
            )
        })
        .collect()
}
