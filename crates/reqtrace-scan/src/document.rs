//! Structured record document
//!
//! A strict serde_yaml view of a record, used only for schema diagnostics.
//! Identifiers and links never come from here; the tolerant line parser in
//! `reqtrace-core` owns those.
//!
//! Record fields are looked up in the record's field mapping:
//! - the value nested under the filename stem, if the root has that key
//! - otherwise the single value of a one-key root mapping
//! - otherwise the root itself

use crate::error::DocumentError;
use serde_yaml::{Mapping, Value};

/// Fields checked by [`RecordDocument::missing_fields`]
pub const REQUIRED_FIELDS: &[&str] = &["text", "ASIL", "Verification Method", "reviewers"];

/// Parsed YAML record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDocument {
    root: Value,
}

impl RecordDocument {
    /// Parse record text
    ///
    /// # Errors
    /// - `DocumentError::Yaml` on syntax errors
    /// - `DocumentError::Empty` if the document is null
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let root: Value = serde_yaml::from_str(text)?;
        if root.is_null() {
            return Err(DocumentError::Empty);
        }
        Ok(Self { root })
    }

    /// Root value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Field mapping of the record stored in file `stem`
    #[must_use]
    pub fn fields(&self, stem: &str) -> Option<&Mapping> {
        let root = self.root.as_mapping()?;
        if let Some(nested) = root.get(stem) {
            return nested.as_mapping();
        }
        if root.len() == 1 {
            return root.values().next().and_then(Value::as_mapping);
        }
        Some(root)
    }

    /// Value at a dot-separated path inside the field mapping
    #[must_use]
    pub fn get_path(&self, stem: &str, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields(stem)?.get(segments.next()?)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }

    /// Required fields that are absent or empty
    #[must_use]
    pub fn missing_fields<'a>(&self, stem: &str, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|field| !self.get_path(stem, field).is_some_and(is_truthy))
            .collect()
    }
}

/// Whether a YAML value counts as present
///
/// Null, `false`, zero, empty strings and empty collections do not.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}
