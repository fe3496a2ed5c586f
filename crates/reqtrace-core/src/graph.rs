//! Traceability graph construction
//!
//! The [`GraphBuilder`] consumes every parsed record of a scan, in scan
//! order, and produces an immutable [`Graph`]. Nodes and edges are kept as
//! two separate collections and only reconciled once all records are known,
//! so an identifier used as a target before its own file is parsed is
//! handled the same as any other.
//!
//! The builder performs no existence checks. Unknown targets stay in the
//! graph; the analyzer decides what they mean.

use crate::classify::{KnownIds, TargetClassifier};
use crate::types::{IdSource, LinkEdge, ParsedRecord, RecordId, SourceLocation, TargetClass};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

/// One parsed record file in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordNode {
    /// Record identifier
    pub id: RecordId,
    /// How the identifier was obtained
    pub id_source: IdSource,
    /// Storage location
    pub location: SourceLocation,
    /// Indices of this record's edges in [`Graph::edges`]
    #[serde(skip)]
    edge_range: Range<usize>,
}

impl RecordNode {
    /// Number of outbound edges declared by this file
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_range.len()
    }
}

/// A link edge with its target class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedEdge {
    /// The declared edge
    #[serde(flatten)]
    pub edge: LinkEdge,
    /// Class of the target
    pub class: TargetClass,
}

/// Identifier declared by more than one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRecord {
    /// Colliding identifier
    pub id: RecordId,
    /// File that declared it first (in scan order)
    pub first: SourceLocation,
    /// Later declaring file
    pub duplicate: SourceLocation,
}

/// Vertex of the link topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertex {
    Record,
    Target,
}

/// Immutable traceability graph
///
/// Records appear once per parsed file, in scan order. The node set is the
/// set of distinct record identifiers. Edges keep file scan order, then
/// in-file order.
#[derive(Debug, Clone)]
pub struct Graph {
    records: Vec<RecordNode>,
    node_index: HashMap<RecordId, usize>,
    edges: Vec<ClassifiedEdge>,
    duplicates: Vec<DuplicateRecord>,
    topology: DiGraph<Vertex, usize>,
    vertices: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Record files in scan order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[RecordNode] {
        &self.records
    }

    /// All edges in deterministic order
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[ClassifiedEdge] {
        &self.edges
    }

    /// Edges declared by one record file
    #[inline]
    #[must_use]
    pub fn edges_of(&self, record: &RecordNode) -> &[ClassifiedEdge] {
        &self.edges[record.edge_range.clone()]
    }

    /// Identifiers declared by more than one file
    #[inline]
    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateRecord] {
        &self.duplicates
    }

    /// Whether an identifier is a node
    #[inline]
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Number of distinct record identifiers
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// First record file declaring an identifier
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&RecordNode> {
        self.node_index.get(id).map(|&i| &self.records[i])
    }

    /// Distinct node identifiers in first-seen order
    pub fn node_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records
            .iter()
            .enumerate()
            .filter(|(i, r)| self.node_index.get(&r.id) == Some(i))
            .map(|(_, r)| &r.id)
    }

    /// Edges whose target string equals `target`, in edge order
    #[must_use]
    pub fn incoming(&self, target: &str) -> Vec<&ClassifiedEdge> {
        self.edges_at(target, Direction::Incoming)
    }

    /// Edges declared by any file with identifier `id`, in edge order
    #[must_use]
    pub fn outgoing(&self, id: &str) -> Vec<&ClassifiedEdge> {
        self.edges_at(id, Direction::Outgoing)
    }

    /// Whether a record node has no edges in either direction
    ///
    /// Names that are not record nodes are never isolated.
    #[must_use]
    pub fn is_isolated(&self, id: &str) -> bool {
        self.vertices.get(id).is_some_and(|&v| {
            self.topology[v] == Vertex::Record
                && self.topology.neighbors_directed(v, Direction::Outgoing).next().is_none()
                && self.topology.neighbors_directed(v, Direction::Incoming).next().is_none()
        })
    }

    fn edges_at(&self, name: &str, direction: Direction) -> Vec<&ClassifiedEdge> {
        let Some(&vertex) = self.vertices.get(name) else {
            return Vec::new();
        };
        let mut indices: Vec<usize> = self
            .topology
            .edges_directed(vertex, direction)
            .map(|e| *e.weight())
            .collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.edges[i]).collect()
    }
}

/// Builder producing a [`Graph`] from parsed records
///
/// Usage:
/// ```rust
/// use reqtrace_core::prelude::*;
///
/// let parser = RecordParser::new();
/// let record = parser.parse("SRD-1:\n  links: [URD-1]\n", &SourceLocation::new("srd/SRD-1.yml"));
/// let graph = GraphBuilder::new(TargetClassifier::default()).build(vec![record]);
/// assert_eq!(graph.edges().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    classifier: TargetClassifier,
}

impl GraphBuilder {
    /// Create builder with a classifier
    #[inline]
    #[must_use]
    pub fn new(classifier: TargetClassifier) -> Self {
        Self { classifier }
    }

    /// Classifier used for edge targets
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &TargetClassifier {
        &self.classifier
    }

    /// Build the graph
    ///
    /// `records` must already be in scan order; the builder keeps that order.
    #[must_use]
    pub fn build(&self, records: Vec<ParsedRecord>) -> Graph {
        let known = KnownIds::from_records(&records);

        let mut nodes: Vec<RecordNode> = Vec::with_capacity(records.len());
        let mut node_index: HashMap<RecordId, usize> = HashMap::new();
        let mut edges = Vec::new();
        let mut duplicates = Vec::new();

        let mut topology: DiGraph<Vertex, usize> = DiGraph::new();
        let mut vertices: HashMap<String, NodeIndex> = HashMap::new();

        for record in &records {
            if let Some(&first) = node_index.get(&record.id) {
                let first = &nodes[first];
                tracing::warn!(
                    id = %record.id,
                    first = %first.location,
                    duplicate = %record.location,
                    "record identifier declared more than once"
                );
                duplicates.push(DuplicateRecord {
                    id: record.id.clone(),
                    first: first.location.clone(),
                    duplicate: record.location.clone(),
                });
            } else {
                node_index.insert(record.id.clone(), nodes.len());
                let v = topology.add_node(Vertex::Record);
                vertices.insert(record.id.as_str().to_string(), v);
            }
            nodes.push(RecordNode {
                id: record.id.clone(),
                id_source: record.id_source,
                location: record.location.clone(),
                edge_range: 0..0,
            });
        }

        for (node, record) in nodes.iter_mut().zip(records) {
            let start = edges.len();
            for edge in record.edges {
                let class = self.classifier.classify(&edge.target, &known);
                let from = vertices[edge.source.as_str()];
                let to = *vertices
                    .entry(edge.target.clone())
                    .or_insert_with(|| topology.add_node(Vertex::Target));
                topology.add_edge(from, to, edges.len());
                edges.push(ClassifiedEdge { edge, class });
            }
            node.edge_range = start..edges.len();
        }

        tracing::debug!(
            records = nodes.len(),
            nodes = node_index.len(),
            edges = edges.len(),
            duplicates = duplicates.len(),
            "graph built"
        );

        Graph {
            records: nodes,
            node_index,
            edges,
            duplicates,
            topology,
            vertices,
        }
    }
}
