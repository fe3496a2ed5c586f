//! Link target classification
//!
//! Decides whether a target names another requirement record or an external
//! evidence artifact. Rules, in order:
//!
//! 1. A known record identifier that is identifier-shaped → requirement
//! 2. First case-insensitive substring pattern match → artifact
//! 3. Identifier-shaped → requirement, anything else → artifact
//!
//! The known-identifier set is an explicit snapshot so classification stays a
//! pure function of its inputs.

use crate::types::{is_identifier_token, ParsedRecord, RecordId, TargetClass};
use std::collections::HashSet;

/// Evidence markers used when the caller supplies no pattern list
pub const DEFAULT_EVIDENCE_PATTERNS: &[&str] = &[
    "artifacts/verification",
    "test",
    "junit",
    "report",
    "coverage",
    ".xml",
    ".json",
];

/// Snapshot of every record identifier in the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIds(HashSet<String>);

impl KnownIds {
    /// Create empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the identifiers of parsed records
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ParsedRecord>) -> Self {
        Self(records.into_iter().map(|r| r.id.as_str().to_string()).collect())
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Number of identifiers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a RecordId> for KnownIds {
    fn from_iter<I: IntoIterator<Item = &'a RecordId>>(iter: I) -> Self {
        Self(iter.into_iter().map(|id| id.as_str().to_string()).collect())
    }
}

impl<'a> FromIterator<&'a str> for KnownIds {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// Target classifier with an ordered evidence pattern list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetClassifier {
    /// Lowercased patterns, empty strings removed
    patterns: Vec<String>,
}

impl Default for TargetClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVIDENCE_PATTERNS.iter().copied())
    }
}

impl TargetClassifier {
    /// Create classifier from an ordered pattern list
    ///
    /// An explicitly empty list is honoured: only identifier shape is used.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Active patterns (lowercased)
    #[inline]
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Classify a link target
    #[must_use]
    pub fn classify(&self, target: &str, known: &KnownIds) -> TargetClass {
        let identifier_shaped = is_identifier_token(target);

        if identifier_shaped && known.contains(target) {
            return TargetClass::RequirementRef;
        }

        if self.matching_pattern(target).is_some() {
            return TargetClass::ArtifactRef;
        }

        if identifier_shaped {
            TargetClass::RequirementRef
        } else {
            TargetClass::ArtifactRef
        }
    }

    /// First pattern contained in the target, if any
    #[must_use]
    pub fn matching_pattern(&self, target: &str) -> Option<&str> {
        let lowered = target.to_lowercase();
        self.patterns
            .iter()
            .find(|p| lowered.contains(p.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn known(ids: &[&str]) -> KnownIds {
        ids.iter().copied().collect()
    }

    #[test]
    fn known_identifier_wins_over_patterns() {
        let classifier = TargetClassifier::default();
        // "LLTC-TEST-1" contains "test" but names a record
        let ids = known(&["LLTC-TEST-1"]);
        assert_eq!(
            classifier.classify("LLTC-TEST-1", &ids),
            TargetClass::RequirementRef
        );
    }

    #[test]
    fn pattern_match_marks_artifact() {
        let classifier = TargetClassifier::default();
        let ids = known(&[]);
        assert_eq!(
            classifier.classify("artifacts/tests/report.xml", &ids),
            TargetClass::ArtifactRef
        );
        assert_eq!(
            classifier.classify("UNIT-TEST-42", &ids),
            TargetClass::ArtifactRef
        );
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let classifier = TargetClassifier::new(["JUnit"]);
        assert_eq!(classifier.matching_pattern("results-junit"), Some("junit"));
        assert_eq!(
            classifier.classify("JUNIT-7", &KnownIds::new()),
            TargetClass::ArtifactRef
        );
    }

    #[test]
    fn fallback_uses_identifier_shape() {
        let classifier = TargetClassifier::new(Vec::<String>::new());
        let ids = KnownIds::new();
        assert_eq!(classifier.classify("SRD-404", &ids), TargetClass::RequirementRef);
        assert_eq!(classifier.classify("docs/design.md", &ids), TargetClass::ArtifactRef);
    }

    #[test]
    fn empty_patterns_are_dropped() {
        let classifier = TargetClassifier::new(["", "cov"]);
        assert_eq!(classifier.patterns(), &["cov".to_string()]);
        assert_eq!(
            classifier.classify("SRD-1", &KnownIds::new()),
            TargetClass::RequirementRef
        );
    }

    #[test]
    fn known_but_not_identifier_shaped_goes_through_patterns() {
        let classifier = TargetClassifier::new(Vec::<String>::new());
        let ids = known(&["SWD 7"]);
        assert_eq!(classifier.classify("SWD 7", &ids), TargetClass::ArtifactRef);
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(target in "[A-Za-z0-9_./ -]{0,24}") {
            let classifier = TargetClassifier::default();
            let ids = known(&["SRD-1", "URD-1"]);
            prop_assert_eq!(
                classifier.classify(&target, &ids),
                classifier.classify(&target, &ids)
            );
        }

        #[test]
        fn known_tokens_are_always_requirements(id in "[A-Za-z0-9_-]{1,16}") {
            let classifier = TargetClassifier::default();
            let ids = known(&[id.as_str()]);
            prop_assert_eq!(classifier.classify(&id, &ids), TargetClass::RequirementRef);
        }
    }
}
