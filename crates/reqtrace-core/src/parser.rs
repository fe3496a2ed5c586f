//! Tolerant requirement record parser
//!
//! Records are hand-edited YAML-like files, so the parser works line by line
//! instead of relying on a grammar. It never fails: a record without a
//! declared identifier falls back to its filename stem, and malformed link
//! declarations simply contribute no edges.
//!
//! Links are collected by three independent passes whose results are
//! concatenated in this order:
//!
//! 1. **Block**: `links:` alone on a line, followed by indented or `-` items
//! 2. **Inline**: `links: [A, B]` or `links: A`
//! 3. **Relation**: `ref:`, `satisfied-by:` and `satisfies:` scalars
//!
//! A record may mix styles. Repeated targets are kept.

use crate::types::{IdSource, LinkEdge, LinkType, ParsedRecord, RecordId, SourceLocation};
use once_cell::sync::Lazy;
use regex::Regex;

static ID_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_\-]+):\s*$").expect("static regex"));

static BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*links:\s*$").expect("static regex"));

static INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*links:\s*(\S.*?)\s*$").expect("static regex"));

static MEMBER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_./][A-Za-z0-9_\-./]*").expect("static regex"));

static RELATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(ref|satisfied-by|satisfies)\s*:\s*(?:"([^"\s]+)"|'([^'\s]+)'|([A-Za-z0-9_\-./]+))\s*$"#,
    )
    .expect("static regex")
});

/// Record parser
///
/// Stateless; one instance can be shared across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser;

impl RecordParser {
    /// Create new parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse one record's text
    ///
    /// `location` supplies the fallback identifier and is stamped on every
    /// edge.
    #[must_use]
    pub fn parse(&self, text: &str, location: &SourceLocation) -> ParsedRecord {
        let (id, id_source) = match declared_identifier(text) {
            Some(token) => (RecordId::new(token), IdSource::Declared),
            None => (RecordId::new(location.file_stem()), IdSource::FilenameStem),
        };

        let lines: Vec<&str> = text.lines().collect();

        let links = block_links(&lines)
            .into_iter()
            .chain(inline_links(&lines))
            .map(|target| (LinkType::Links, target));
        let relations = relation_links(&lines);

        let edges: Vec<LinkEdge> = links
            .chain(relations)
            .map(|(link_type, target)| LinkEdge {
                source: id.clone(),
                target,
                link_type,
                location: location.clone(),
            })
            .collect();

        tracing::trace!(
            record = %id,
            location = %location,
            edges = edges.len(),
            "parsed record"
        );

        ParsedRecord {
            id,
            id_source,
            location: location.clone(),
            edges,
        }
    }
}

/// Identifier declared on the first non-blank line, if any
///
/// Only the first non-blank line is examined: a `links:` key further down
/// must never become an identifier.
#[must_use]
pub fn declared_identifier(text: &str) -> Option<&str> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    ID_LINE
        .captures(first)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Targets from `links:` blocks
fn block_links(lines: &[&str]) -> Vec<String> {
    let mut targets = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if !BLOCK_OPEN.is_match(line) {
            continue;
        }

        for member in &lines[i + 1..] {
            if member.trim().is_empty() {
                continue;
            }
            if !member.starts_with([' ', '\t', '-']) {
                break;
            }
            if member.trim_start().starts_with('#') {
                continue;
            }
            if let Some(target) = member_target(member) {
                targets.push(target);
            }
        }
    }

    targets
}

/// First target token of a block member line
fn member_target(line: &str) -> Option<String> {
    MEMBER_TOKEN
        .find_iter(line)
        .map(|m| m.as_str().trim_end_matches('.'))
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Targets from single-line `links: ...` declarations
fn inline_links(lines: &[&str]) -> Vec<String> {
    let mut targets = Vec::new();

    for line in lines {
        let Some(value) = INLINE.captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        let value = value.as_str();
        if matches!(value, "null" | "~") {
            continue;
        }

        targets.extend(
            value
                .split(|c: char| c.is_whitespace() || c == ',')
                .map(|token| token.trim_matches(|c| matches!(c, '[' | ']' | '"' | '\'')))
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        );
    }

    targets
}

/// Targets from `ref:`, `satisfied-by:` and `satisfies:` scalars
fn relation_links(lines: &[&str]) -> Vec<(LinkType, String)> {
    lines
        .iter()
        .filter_map(|line| {
            let caps = RELATION.captures(line)?;
            let link_type = caps.get(1)?.as_str().parse::<LinkType>().ok()?;
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
            Some((link_type, value.as_str().to_string()))
        })
        .collect()
}
