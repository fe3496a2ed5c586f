//! Matrix projections of the traceability graph
//!
//! - **Forward**: one row per edge, `record → target`. A record without edges
//!   still gets one row with an empty target so its presence stays visible.
//! - **Backward**: the same rows in the same order with the record and target
//!   columns swapped, for "who points at me" queries.
//! - **Category**: forward rows partitioned by the first path segment of the
//!   record location, with a per-category summary.
//!
//! Rows are never dropped implicitly. The only filter is the explicit
//! [`CategoryFilter`], and the categories it excludes are returned.

use crate::error::{CoreError, CoreResult};
use crate::graph::Graph;
use crate::types::{LinkType, RecordId, SourceLocation, TargetClass};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Forward matrix column names
pub const FORWARD_COLUMNS: [&str; 4] = ["record_id", "target_id", "link_type", "source_location"];

/// Backward matrix column names
pub const BACKWARD_COLUMNS: [&str; 4] = ["target_id", "record_id", "link_type", "source_location"];

/// One matrix row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    /// Declaring record
    pub record_id: RecordId,
    /// Link target, empty for the no-links placeholder
    pub target_id: String,
    /// Link type, `None` for the placeholder
    pub link_type: Option<LinkType>,
    /// Record location
    pub source_location: SourceLocation,
    /// Target class, `None` for the placeholder
    pub target_class: Option<TargetClass>,
}

impl MatrixRow {
    /// Whether this is the placeholder row of a record without links
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.link_type.is_none()
    }

    /// Link type as written in matrices (empty for placeholders)
    #[inline]
    #[must_use]
    pub fn link_type_str(&self) -> &'static str {
        self.link_type.map_or("", LinkType::as_str)
    }

    /// Category of the declaring record
    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        self.source_location.category()
    }
}

/// Forward projection: record → target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardMatrix {
    rows: Vec<MatrixRow>,
}

impl ForwardMatrix {
    /// Column names
    pub const COLUMNS: [&'static str; 4] = FORWARD_COLUMNS;

    /// All rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Row cells in column order
    #[must_use]
    pub fn cells(row: &MatrixRow) -> [&str; 4] {
        [
            row.record_id.as_str(),
            &row.target_id,
            row.link_type_str(),
            row.source_location.as_str(),
        ]
    }

    /// Number of rows that represent an edge
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_placeholder()).count()
    }
}

/// Backward projection: target → record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackwardMatrix {
    rows: Vec<MatrixRow>,
}

impl BackwardMatrix {
    /// Column names
    pub const COLUMNS: [&'static str; 4] = BACKWARD_COLUMNS;

    /// All rows, in forward order
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Row cells in column order
    #[must_use]
    pub fn cells(row: &MatrixRow) -> [&str; 4] {
        [
            &row.target_id,
            row.record_id.as_str(),
            row.link_type_str(),
            row.source_location.as_str(),
        ]
    }

    /// Rows whose target is `target`
    pub fn pointing_at<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a MatrixRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| !r.is_placeholder() && r.target_id == target)
    }
}

/// Per-category counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// Category label
    pub category: String,
    /// Record files in the category
    pub records: usize,
    /// Edges declared by those records
    pub edges: usize,
}

/// Which categories get a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every category
    #[default]
    All,
    /// Only the named categories
    Only(BTreeSet<String>),
}

impl CategoryFilter {
    /// Filter from category names; an empty list selects everything
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::All
        } else {
            Self::Only(names)
        }
    }

    /// Whether a category passes the filter
    #[must_use]
    pub fn selects(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(category),
        }
    }
}

/// Category projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProjection {
    /// Forward rows per selected category
    pub tables: BTreeMap<String, Vec<MatrixRow>>,
    /// Counts for every category, selected or not
    pub summary: Vec<CategorySummary>,
    /// Categories present in the graph but excluded by the filter
    pub excluded: Vec<String>,
}

/// Projects a [`Graph`] into matrices
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixProjector;

impl MatrixProjector {
    /// Create new projector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Forward projection
    #[must_use]
    pub fn forward(&self, graph: &Graph) -> ForwardMatrix {
        let mut rows = Vec::with_capacity(graph.edges().len() + graph.records().len());

        for record in graph.records() {
            let edges = graph.edges_of(record);
            if edges.is_empty() {
                rows.push(MatrixRow {
                    record_id: record.id.clone(),
                    target_id: String::new(),
                    link_type: None,
                    source_location: record.location.clone(),
                    target_class: None,
                });
                continue;
            }
            rows.extend(edges.iter().map(|e| MatrixRow {
                record_id: e.edge.source.clone(),
                target_id: e.edge.target.clone(),
                link_type: Some(e.edge.link_type),
                source_location: e.edge.location.clone(),
                target_class: Some(e.class),
            }));
        }

        ForwardMatrix { rows }
    }

    /// Backward projection
    #[must_use]
    pub fn backward(&self, graph: &Graph) -> BackwardMatrix {
        BackwardMatrix {
            rows: self.forward(graph).rows,
        }
    }

    /// Category projection
    ///
    /// # Errors
    /// - `CoreError::UnknownCategory` if the filter names categories that
    ///   have no records
    pub fn categories(
        &self,
        graph: &Graph,
        filter: &CategoryFilter,
    ) -> CoreResult<CategoryProjection> {
        let mut all: BTreeMap<String, Vec<MatrixRow>> = BTreeMap::new();
        for row in self.forward(graph).rows {
            all.entry(row.category().to_string()).or_default().push(row);
        }

        if let CategoryFilter::Only(names) = filter {
            let unknown: Vec<String> = names
                .iter()
                .filter(|n| !all.contains_key(n.as_str()))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(CoreError::UnknownCategory(unknown));
            }
        }

        let summary = all
            .iter()
            .map(|(category, rows)| CategorySummary {
                category: category.clone(),
                records: rows
                    .iter()
                    .map(|r| &r.source_location)
                    .collect::<BTreeSet<_>>()
                    .len(),
                edges: rows.iter().filter(|r| !r.is_placeholder()).count(),
            })
            .collect();

        let (tables, excluded): (BTreeMap<_, _>, BTreeMap<_, _>) =
            all.into_iter().partition(|(category, _)| filter.selects(category));

        Ok(CategoryProjection {
            tables,
            summary,
            excluded: excluded.into_keys().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::parser::RecordParser;
    use pretty_assertions::assert_eq;

    fn graph(files: &[(&str, &str)]) -> Graph {
        let parser = RecordParser::new();
        let records = files
            .iter()
            .map(|(loc, text)| parser.parse(text, &SourceLocation::new(*loc)))
            .collect();
        GraphBuilder::default().build(records)
    }

    fn sample() -> Graph {
        graph(&[
            ("urd/URD-1.yml", "URD-1:\n  text: root\n"),
            ("srd/SRD-1.yml", "SRD-1:\n  links: [URD-1]\n"),
            (
                "swd/SWD-1.yml",
                "SWD-1:\n  links: [SRD-1, \"artifacts/tests/report.xml\"]\n",
            ),
        ])
    }

    #[test]
    fn forward_has_placeholder_for_unlinked_record() {
        let forward = MatrixProjector::new().forward(&sample());
        let cells: Vec<[&str; 4]> = forward.rows().iter().map(ForwardMatrix::cells).collect();
        assert_eq!(
            cells,
            vec![
                ["URD-1", "", "", "urd/URD-1.yml"],
                ["SRD-1", "URD-1", "links", "srd/SRD-1.yml"],
                ["SWD-1", "SRD-1", "links", "swd/SWD-1.yml"],
                ["SWD-1", "artifacts/tests/report.xml", "links", "swd/SWD-1.yml"],
            ]
        );
        assert_eq!(forward.link_count(), 3);
    }

    #[test]
    fn backward_swaps_columns_and_keeps_order() {
        let projector = MatrixProjector::new();
        let g = sample();
        let forward = projector.forward(&g);
        let backward = projector.backward(&g);
        assert_eq!(forward.rows(), backward.rows());
        assert_eq!(
            BackwardMatrix::cells(&backward.rows()[1]),
            ["URD-1", "SRD-1", "links", "srd/SRD-1.yml"]
        );
    }

    #[test]
    fn pointing_at_finds_all_sources() {
        let g = graph(&[
            ("a/A.yml", "A:\n  links: [C]\n"),
            ("a/B.yml", "B:\n  links: [C, C]\n"),
        ]);
        let backward = MatrixProjector::new().backward(&g);
        let sources: Vec<&str> = backward
            .pointing_at("C")
            .map(|r| r.record_id.as_str())
            .collect();
        assert_eq!(sources, vec!["A", "B", "B"]);
        assert_eq!(backward.pointing_at("").count(), 0);
    }

    #[test]
    fn categories_partition_every_row() {
        let projection = MatrixProjector::new()
            .categories(&sample(), &CategoryFilter::All)
            .unwrap();
        let names: Vec<&str> = projection.tables.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["srd", "swd", "urd"]);
        assert_eq!(projection.tables["swd"].len(), 2);
        assert!(projection.excluded.is_empty());

        let swd = projection.summary.iter().find(|s| s.category == "swd").unwrap();
        assert_eq!((swd.records, swd.edges), (1, 2));
        let urd = projection.summary.iter().find(|s| s.category == "urd").unwrap();
        assert_eq!((urd.records, urd.edges), (1, 0));
    }

    #[test]
    fn category_filter_reports_exclusions() {
        let filter = CategoryFilter::from_names(["swd"]);
        let projection = MatrixProjector::new().categories(&sample(), &filter).unwrap();
        assert_eq!(projection.tables.len(), 1);
        assert_eq!(projection.excluded, vec!["srd".to_string(), "urd".to_string()]);
        assert_eq!(projection.summary.len(), 3);
    }

    #[test]
    fn unknown_category_in_filter_is_an_error() {
        let filter = CategoryFilter::from_names(["hw"]);
        let err = MatrixProjector::new().categories(&sample(), &filter).unwrap_err();
        assert_eq!(err, CoreError::UnknownCategory(vec!["hw".to_string()]));
    }

    #[test]
    fn empty_name_list_selects_all() {
        assert_eq!(CategoryFilter::from_names(Vec::<String>::new()), CategoryFilter::All);
    }
}
