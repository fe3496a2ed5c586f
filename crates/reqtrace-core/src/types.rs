//! Core types for the traceability graph
//!
//! Defines the fundamental values flowing through the pipeline:
//! - Record identifiers and where they were declared
//! - Link edges and their relation type
//! - Target classes assigned by the classifier
//! - Scan tallies handed from the scanner to the analyzer

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

/// Category assigned to records stored directly under the corpus root
pub const ROOT_CATEGORY: &str = "_root";

/// Check whether a string is a well-formed identifier token
///
/// Identifier tokens are non-empty and consist solely of ASCII alphanumerics,
/// underscores and hyphens (e.g. `SWD-001`, `lltc_12`).
#[inline]
#[must_use]
pub fn is_identifier_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Identifier of a requirement record
///
/// Usually an identifier token declared on the first line of the record.
/// Records without one fall back to their filename stem, which may contain
/// other characters, so construction through [`RecordId::new`] does not
/// validate. Use [`FromStr`] for strict parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create identifier without validation
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier is a well-formed identifier token
    #[inline]
    #[must_use]
    pub fn is_token(&self) -> bool {
        is_identifier_token(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_identifier_token(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::InvalidIdentifier(s.to_string()))
        }
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// How a record's identifier was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdSource {
    /// Declared as `<token>:` on the first non-blank line
    Declared,
    /// Taken from the filename stem
    FilenameStem,
}

/// Relation key a link was declared under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    /// `links:` block or inline list
    Links,
    /// `ref:` scalar
    Ref,
    /// `satisfied-by:` scalar
    SatisfiedBy,
    /// `satisfies:` scalar
    Satisfies,
}

impl LinkType {
    /// All link types, in declaration-key order
    pub const ALL: [Self; 4] = [Self::Links, Self::Ref, Self::SatisfiedBy, Self::Satisfies];

    /// Key name as written in records and matrices
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::Ref => "ref",
            Self::SatisfiedBy => "satisfied-by",
            Self::Satisfies => "satisfies",
        }
    }
}

impl FromStr for LinkType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownLinkType(s.to_string()))
    }
}

impl Display for LinkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class of a link target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetClass {
    /// Another requirement record
    RequirementRef,
    /// External evidence (test report, coverage file, ...)
    ArtifactRef,
}

impl TargetClass {
    /// Tag as written in reports
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequirementRef => "requirement-ref",
            Self::ArtifactRef => "artifact-ref",
        }
    }
}

impl Display for TargetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a record relative to the corpus root
///
/// Always uses `/` separators so matrices are identical across platforms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocation(String);

impl SourceLocation {
    /// Create from an already normalised relative path string
    #[inline]
    #[must_use]
    pub fn new(relative: impl Into<String>) -> Self {
        Self(relative.into().replace('\\', "/"))
    }

    /// Create from a path relative to the corpus root
    ///
    /// Only normal components are kept; `.` and prefixes are dropped.
    #[must_use]
    pub fn from_relative_path(path: &Path) -> Self {
        let segments: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self(segments.join("/"))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Category label: first path segment under the corpus root
    ///
    /// Records stored directly at the root belong to [`ROOT_CATEGORY`].
    #[must_use]
    pub fn category(&self) -> &str {
        let mut segments = self.segments();
        match (segments.next(), segments.next()) {
            (Some(first), Some(_)) => first,
            _ => ROOT_CATEGORY,
        }
    }

    /// Filename without its final extension
    #[must_use]
    pub fn file_stem(&self) -> &str {
        let name = self.segments().last().unwrap_or("");
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared relation from a record to a target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEdge {
    /// Declaring record
    pub source: RecordId,
    /// Target string, opaque until classified
    pub target: String,
    /// Key the link was declared under
    pub link_type: LinkType,
    /// Where the declaring record is stored
    pub location: SourceLocation,
}

/// Output of the record parser for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// Record identifier
    pub id: RecordId,
    /// How the identifier was obtained
    pub id_source: IdSource,
    /// Storage location
    pub location: SourceLocation,
    /// Outbound edges in in-file order, duplicates preserved
    pub edges: Vec<LinkEdge>,
}

/// File counts from a scan, handed to the analyzer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTally {
    /// Record files discovered
    pub discovered: usize,
    /// Files that could not be read
    pub failed: usize,
    /// Files never started because the scan was cancelled
    pub skipped: usize,
}

impl ScanTally {
    /// Tally for a scan where every discovered file was read
    #[inline]
    #[must_use]
    pub const fn from_records(count: usize) -> Self {
        Self {
            discovered: count,
            failed: 0,
            skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_token_shape() {
        assert!(is_identifier_token("SWD-001"));
        assert!(is_identifier_token("lltc_12"));
        assert!(!is_identifier_token(""));
        assert!(!is_identifier_token("a/b"));
        assert!(!is_identifier_token("report.xml"));
        assert!(!is_identifier_token("SWD 1"));
    }

    #[test]
    fn record_id_from_str_validates() {
        assert_eq!("SRD-2".parse::<RecordId>().unwrap().as_str(), "SRD-2");
        assert!(matches!(
            "x.y".parse::<RecordId>(),
            Err(CoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn link_type_round_trips_key_names() {
        for t in LinkType::ALL {
            assert_eq!(t.as_str().parse::<LinkType>().unwrap(), t);
        }
        assert!("parent".parse::<LinkType>().is_err());
    }

    #[test]
    fn location_category_is_first_segment() {
        assert_eq!(SourceLocation::new("swd/SWD-001.yml").category(), "swd");
        assert_eq!(SourceLocation::new("swd/motor/SWD-002.yml").category(), "swd");
        assert_eq!(SourceLocation::new("SWD-003.yml").category(), ROOT_CATEGORY);
    }

    #[test]
    fn location_normalises_separators() {
        let loc = SourceLocation::new("srd\\SRD-1.yaml");
        assert_eq!(loc.as_str(), "srd/SRD-1.yaml");

        let loc = SourceLocation::from_relative_path(Path::new("./urd/URD-1.yml"));
        assert_eq!(loc.as_str(), "urd/URD-1.yml");
    }

    #[test]
    fn location_file_stem() {
        assert_eq!(SourceLocation::new("swd/SWD-007.yml").file_stem(), "SWD-007");
        assert_eq!(SourceLocation::new("a/b.c.yaml").file_stem(), "b.c");
        assert_eq!(SourceLocation::new(".hidden").file_stem(), ".hidden");
    }

    #[test]
    fn target_class_tags() {
        assert_eq!(TargetClass::RequirementRef.to_string(), "requirement-ref");
        assert_eq!(TargetClass::ArtifactRef.to_string(), "artifact-ref");
    }
}
