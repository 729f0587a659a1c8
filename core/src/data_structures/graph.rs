//! Arena graph data structure with per-vertex color labels
//!
//! This module implements the graph representation consumed by the
//! refinement and search engines. Vertices live in a contiguous arena and
//! are addressed by `NodeId` indices, which makes independent duplication a
//! plain `Clone` and disjoint union a concatenation with an index offset.
//!
//! # Representation
//! Adjacency is kept twice: outgoing lists drive neighbor enumeration and
//! incoming lists let directed graphs be refined on both edge orientations.
//! For undirected graphs both lists are identical, so every query behaves
//! as on a symmetric edge relation.

use std::collections::HashSet;
use std::fmt;
use std::ops::Add;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{AlgorithmError, NodeId};

/// Vertex color label
///
/// Only the partition induced by the labels is meaningful; the numeric
/// value matters solely for allocating fresh, unused labels.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Color(pub usize);

impl Color {
    /// The label immediately after this one
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Graph vertex: a stable identity plus an optional color label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub id: NodeId,
    pub color: Option<Color>,
}

/// Finite simple graph, directed or undirected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    vertices: Vec<Vertex>,
    out_adjacency: Vec<Vec<NodeId>>,
    in_adjacency: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl Graph {
    /// Creates an empty graph
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    /// Creates an empty undirected graph
    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Creates an empty directed graph
    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Creates a graph with `count` uncolored, isolated vertices
    pub fn with_vertices(count: usize, directed: bool) -> Self {
        let mut graph = Self::new(directed);
        for _ in 0..count {
            graph.add_vertex();
        }
        graph
    }

    /// Builds a graph on `count` vertices from an edge list
    pub fn from_edges(
        count: usize,
        edges: &[(usize, usize)],
        directed: bool,
    ) -> Result<Self, AlgorithmError> {
        let mut graph = Self::with_vertices(count, directed);
        for &(source, target) in edges {
            graph.add_edge(NodeId(source), NodeId(target))?;
        }
        Ok(graph)
    }

    /// Adds an uncolored vertex and returns its identifier
    pub fn add_vertex(&mut self) -> NodeId {
        let id = NodeId(self.vertices.len());
        self.vertices.push(Vertex { id, color: None });
        self.out_adjacency.push(Vec::new());
        self.in_adjacency.push(Vec::new());
        id
    }

    /// Adds a vertex carrying a pre-assigned color
    pub fn add_colored_vertex(&mut self, color: Color) -> NodeId {
        let id = self.add_vertex();
        self.vertices[id.0].color = Some(color);
        id
    }

    /// Adds an edge; undirected edges are recorded in both endpoint lists
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<(), AlgorithmError> {
        self.check(source)?;
        self.check(target)?;

        if self.has_edge(source, target) {
            return Err(AlgorithmError::DuplicateEdge(source, target));
        }

        if self.directed {
            self.out_adjacency[source.0].push(target);
            self.in_adjacency[target.0].push(source);
        } else {
            self.out_adjacency[source.0].push(target);
            self.in_adjacency[source.0].push(target);
            if source != target {
                self.out_adjacency[target.0].push(source);
                self.in_adjacency[target.0].push(source);
            }
        }

        self.edge_count += 1;
        Ok(())
    }

    #[inline]
    fn check(&self, id: NodeId) -> Result<(), AlgorithmError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(AlgorithmError::InvalidNode(id))
        }
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether `id` addresses a vertex of this graph
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.vertices.len()
    }

    /// Vertices in sequence order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter()
    }

    /// Vertex identifiers in sequence order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.vertices.len()).map(NodeId)
    }

    /// Outgoing neighbors (all neighbors for undirected graphs)
    ///
    /// Panics if `id` is out of range; callers iterate over `node_ids`.
    #[inline]
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.out_adjacency[id.0]
    }

    /// Incoming neighbors (all neighbors for undirected graphs)
    #[inline]
    pub fn in_neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.in_adjacency[id.0]
    }

    #[inline]
    pub fn degree(&self, id: NodeId) -> usize {
        self.out_adjacency[id.0].len()
    }

    #[inline]
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.in_adjacency[id.0].len()
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.out_adjacency
            .get(source.0)
            .map_or(false, |neighbors| neighbors.contains(&target))
    }

    #[inline]
    pub fn color(&self, id: NodeId) -> Option<Color> {
        self.vertices.get(id.0).and_then(|v| v.color)
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<(), AlgorithmError> {
        let vertex = self.vertices
            .get_mut(id.0)
            .ok_or(AlgorithmError::InvalidNode(id))?;
        vertex.color = Some(color);
        Ok(())
    }

    /// Overwrites every vertex color from a label slice indexed by `NodeId`
    pub fn assign_colors(&mut self, labels: &[Color]) -> Result<(), AlgorithmError> {
        if labels.len() != self.vertices.len() {
            return Err(AlgorithmError::InvalidGraph(format!(
                "{} labels supplied for {} vertices",
                labels.len(),
                self.vertices.len()
            )));
        }
        self.paint(labels);
        Ok(())
    }

    /// Writes labels produced from this graph's own vertex sequence
    pub(crate) fn paint(&mut self, labels: &[Color]) {
        debug_assert_eq!(labels.len(), self.vertices.len());
        for (vertex, &label) in self.vertices.iter_mut().zip(labels) {
            vertex.color = Some(label);
        }
    }

    /// Removes every color label
    pub fn clear_colors(&mut self) {
        for vertex in &mut self.vertices {
            vertex.color = None;
        }
    }

    /// Largest color label currently in use
    pub fn max_color(&self) -> Option<Color> {
        self.vertices.iter().filter_map(|v| v.color).max()
    }

    /// Disjoint union: `other`'s vertices follow this graph's, shifted by
    /// `self.vertex_count()`, with no edges between the two parts
    pub fn disjoint_union(&self, other: &Graph) -> Result<Graph, AlgorithmError> {
        if self.directed != other.directed {
            return Err(AlgorithmError::InvalidGraph(
                "cannot unite a directed and an undirected graph".into(),
            ));
        }

        let offset = self.vertices.len();
        let mut union = self.clone();

        union.vertices.extend(other.vertices.iter().map(|v| Vertex {
            id: v.id.offset(offset),
            color: v.color,
        }));
        union.out_adjacency.extend(
            other.out_adjacency
                .iter()
                .map(|list| list.iter().map(|n| n.offset(offset)).collect::<Vec<_>>()),
        );
        union.in_adjacency.extend(
            other.in_adjacency
                .iter()
                .map(|list| list.iter().map(|n| n.offset(offset)).collect::<Vec<_>>()),
        );
        union.edge_count += other.edge_count;

        Ok(union)
    }

    /// Left fold of `disjoint_union` over a batch
    pub fn union_all(graphs: &[Graph]) -> Result<Graph, AlgorithmError> {
        let Some((first, rest)) = graphs.split_first() else {
            return Ok(Graph::undirected());
        };
        rest.iter()
            .try_fold(first.clone(), |acc, graph| acc.disjoint_union(graph))
    }

    /// Validates adjacency consistency
    ///
    /// Graphs built through `add_edge` always pass; deserialized graphs may
    /// not.
    pub fn validate(&self) -> Result<(), AlgorithmError> {
        let n = self.vertices.len();
        if self.out_adjacency.len() != n || self.in_adjacency.len() != n {
            return Err(AlgorithmError::InvalidGraph(format!(
                "{} vertices but {} outgoing and {} incoming adjacency lists",
                n,
                self.out_adjacency.len(),
                self.in_adjacency.len()
            )));
        }
        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.id != NodeId(index) {
                return Err(AlgorithmError::InvalidGraph(format!(
                    "vertex {} stored at position {}",
                    vertex.id, index
                )));
            }
        }

        let mut seen = HashSet::new();
        let mut arcs = 0usize;
        let mut incoming = 0usize;

        for id in self.node_ids() {
            seen.clear();
            for &neighbor in self.neighbors(id) {
                self.check(neighbor)?;
                if !seen.insert(neighbor) {
                    return Err(AlgorithmError::DuplicateEdge(id, neighbor));
                }
                if !self.in_neighbors(neighbor).contains(&id) {
                    return Err(AlgorithmError::InvalidGraph(format!(
                        "arc {} -> {} missing from incoming list",
                        id, neighbor
                    )));
                }
                arcs += 1;
            }

            seen.clear();
            for &source in self.in_neighbors(id) {
                self.check(source)?;
                if !seen.insert(source) || !self.has_edge(source, id) {
                    return Err(AlgorithmError::InvalidGraph(format!(
                        "incoming entry {} of {} has no matching arc",
                        source, id
                    )));
                }
                incoming += 1;
            }
        }

        // an undirected loop occupies one slot, every other edge two
        let loops = self.node_ids().filter(|&id| self.has_edge(id, id)).count();
        let consistent = if self.directed {
            arcs == self.edge_count
        } else {
            self.edge_count.checked_mul(2) == Some(arcs + loops)
        };

        if !consistent || incoming != arcs {
            return Err(AlgorithmError::InvalidGraph(format!(
                "adjacency holds {} arcs ({} loops), recorded edge count is {}",
                arcs, loops, self.edge_count
            )));
        }
        Ok(())
    }
}

impl Add<&Graph> for &Graph {
    type Output = Graph;

    /// Disjoint union; a directed operand makes the result directed
    fn add(self, other: &Graph) -> Graph {
        if self.directed == other.directed {
            if let Ok(union) = self.disjoint_union(other) {
                return union;
            }
        }
        let mut left = self.clone();
        left.promote_to_directed();
        let mut right = other.clone();
        right.promote_to_directed();
        // both operands are directed now
        left.disjoint_union(&right).unwrap_or(left)
    }
}

impl Graph {
    /// Reinterprets every undirected edge as a pair of opposite arcs
    fn promote_to_directed(&mut self) {
        if self.directed {
            return;
        }
        self.directed = true;
        // each undirected edge already occupies one outgoing slot per arc
        self.edge_count = self.out_adjacency.iter().map(Vec::len).sum();
    }
}
