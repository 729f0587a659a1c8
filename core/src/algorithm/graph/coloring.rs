//! Coloring model: partitions of a vertex set into color classes
//!
//! A `Coloring` is an immutable snapshot of the labels carried by a fully
//! colored graph. Every query here is pure; refinement and individualization
//! produce new colorings instead of mutating existing ones.
//!
//! # Stability
//! A coloring is *stable* for a graph when, for every ordered pair of
//! classes (C, D), all vertices of C have the same number of outgoing and
//! incoming neighbors inside D.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Color, Graph};

/// How the search decides whether the two halves of a pair are balanced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Both halves expose the same set of colors
    #[default]
    ColorSet,
    /// Both halves expose every color the same number of times
    ColorMultiset,
}

/// Snapshot of a vertex coloring indexed by `NodeId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coloring {
    labels: Vec<Color>,
}

impl Coloring {
    /// Wraps raw labels; `labels[i]` is the color of `NodeId(i)`
    pub fn new(labels: Vec<Color>) -> Self {
        Self { labels }
    }

    /// Reads the labels of a fully colored graph
    pub fn from_graph(graph: &Graph) -> Result<Self, AlgorithmError> {
        let labels = graph
            .vertices()
            .map(|v| v.color.ok_or(AlgorithmError::UncoloredVertex(v.id)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { labels })
    }

    #[inline]
    pub fn color(&self, id: NodeId) -> Color {
        self.labels[id.0]
    }

    #[inline]
    pub fn labels(&self) -> &[Color] {
        &self.labels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Range covering every vertex
    #[inline]
    pub fn full_range(&self) -> Range<usize> {
        0..self.labels.len()
    }

    /// Color classes ordered by label, members in vertex order
    pub fn classes(&self) -> BTreeMap<Color, Vec<NodeId>> {
        let mut classes: BTreeMap<Color, Vec<NodeId>> = BTreeMap::new();
        for (index, &color) in self.labels.iter().enumerate() {
            classes.entry(color).or_default().push(NodeId(index));
        }
        classes
    }

    /// Members of the class labelled `color`
    pub fn class_of(&self, color: Color) -> Vec<NodeId> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == color)
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    pub fn class_size(&self, color: Color) -> usize {
        self.labels.iter().filter(|&&c| c == color).count()
    }

    pub fn num_classes(&self) -> usize {
        self.color_set(self.full_range()).len()
    }

    /// Multiset of colors among the outgoing neighbors of `id`
    pub fn neighbor_colors(&self, graph: &Graph, id: NodeId) -> BTreeMap<Color, usize> {
        let mut colors = BTreeMap::new();
        for &neighbor in graph.neighbors(id) {
            *colors.entry(self.color(neighbor)).or_insert(0) += 1;
        }
        colors
    }

    /// Colors present among the vertices in `range`
    pub fn color_set(&self, range: Range<usize>) -> BTreeSet<Color> {
        self.labels[range].iter().copied().collect()
    }

    /// Class sizes restricted to the vertices in `range`
    pub fn class_sizes(&self, range: Range<usize>) -> BTreeMap<Color, usize> {
        let mut sizes = BTreeMap::new();
        for &color in &self.labels[range] {
            *sizes.entry(color).or_insert(0) += 1;
        }
        sizes
    }

    /// Number of classes that hold exactly one vertex of `range`
    pub fn singleton_count(&self, range: Range<usize>) -> usize {
        self.class_sizes(range).values().filter(|&&n| n == 1).count()
    }

    /// Every class restricted to `range` is a singleton
    pub fn is_discrete(&self, range: Range<usize>) -> bool {
        let len = range.len();
        self.color_set(range).len() == len
    }

    /// Whether the vertices in `left` and `right` look alike under `policy`
    pub fn is_balanced(&self, left: Range<usize>, right: Range<usize>, policy: BalancePolicy) -> bool {
        match policy {
            BalancePolicy::ColorSet => self.color_set(left) == self.color_set(right),
            BalancePolicy::ColorMultiset => self.class_sizes(left) == self.class_sizes(right),
        }
    }

    /// Identical classes, regardless of the labels naming them
    pub fn same_partition(&self, other: &Coloring) -> bool {
        if self.labels.len() != other.labels.len() {
            return false;
        }

        let mut forward: HashMap<Color, Color> = HashMap::new();
        let mut backward: HashMap<Color, Color> = HashMap::new();

        self.labels.iter().zip(&other.labels).all(|(&mine, &theirs)| {
            *forward.entry(mine).or_insert(theirs) == theirs
                && *backward.entry(theirs).or_insert(mine) == mine
        })
    }

    /// Stability check: every class has a uniform neighbor profile
    pub fn is_stable(&self, graph: &Graph) -> bool {
        let mut profiles: HashMap<Color, (Vec<(Color, usize)>, Vec<(Color, usize)>)> = HashMap::new();

        graph.node_ids().all(|id| {
            let profile = (
                self.profile(graph.neighbors(id)),
                self.profile(graph.in_neighbors(id)),
            );
            match profiles.get(&self.color(id)) {
                Some(existing) => *existing == profile,
                None => {
                    profiles.insert(self.color(id), profile);
                    true
                }
            }
        })
    }

    fn profile(&self, neighbors: &[NodeId]) -> Vec<(Color, usize)> {
        let mut counts = BTreeMap::new();
        for &neighbor in neighbors {
            *counts.entry(self.color(neighbor)).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    pub fn max_color(&self) -> Option<Color> {
        self.labels.iter().copied().max()
    }

    /// First label guaranteed unused: one past the maximum
    pub fn next_color(&self) -> Color {
        self.max_color().map_or(Color(0), Color::next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(raw: &[usize]) -> Coloring {
        Coloring::new(raw.iter().map(|&c| Color(c)).collect())
    }

    #[test]
    fn test_class_queries() {
        let coloring = colors(&[2, 5, 2, 7, 5]);

        assert_eq!(coloring.num_classes(), 3);
        assert_eq!(coloring.class_of(Color(2)), vec![NodeId(0), NodeId(2)]);
        assert_eq!(coloring.class_size(Color(5)), 2);
        assert_eq!(coloring.class_size(Color(9)), 0);
        assert_eq!(coloring.classes().keys().copied().collect::<Vec<_>>(), vec![Color(2), Color(5), Color(7)]);
        assert_eq!(coloring.next_color(), Color(8));
        assert_eq!(Coloring::new(Vec::new()).next_color(), Color(0));
    }

    #[test]
    fn test_from_graph_requires_colors() {
        let mut graph = Graph::with_vertices(2, false);
        assert_eq!(
            Coloring::from_graph(&graph),
            Err(AlgorithmError::UncoloredVertex(NodeId(0)))
        );
        graph.assign_colors(&[Color(1), Color(1)]).unwrap();
        assert_eq!(Coloring::from_graph(&graph).unwrap(), colors(&[1, 1]));
    }

    #[test]
    fn test_discrete_and_singletons() {
        let coloring = colors(&[0, 1, 2, 0, 1, 1]);
        assert!(coloring.is_discrete(0..3));
        assert!(!coloring.is_discrete(3..6));
        assert_eq!(coloring.singleton_count(0..3), 3);
        assert_eq!(coloring.singleton_count(3..6), 1);
    }

    #[test]
    fn test_balance_policies_disagree_on_class_sizes() {
        // left: {a, a, b}, right: {a, b, b}: same colors, different sizes
        let coloring = colors(&[1, 1, 2, 1, 2, 2]);
        assert!(coloring.is_balanced(0..3, 3..6, BalancePolicy::ColorSet));
        assert!(!coloring.is_balanced(0..3, 3..6, BalancePolicy::ColorMultiset));

        let mirrored = colors(&[1, 2, 2, 2, 1, 2]);
        assert!(mirrored.is_balanced(0..3, 3..6, BalancePolicy::ColorSet));
        assert!(mirrored.is_balanced(0..3, 3..6, BalancePolicy::ColorMultiset));
    }

    #[test]
    fn test_same_partition_ignores_labels() {
        let a = colors(&[0, 0, 1, 2]);
        let b = colors(&[9, 9, 4, 3]);
        let c = colors(&[9, 4, 4, 3]);
        let d = colors(&[1, 1, 1, 2]);

        assert!(a.same_partition(&b));
        assert!(!a.same_partition(&c));
        assert!(!a.same_partition(&d));
        assert!(!d.same_partition(&a));
        assert!(!a.same_partition(&colors(&[0, 0, 1])));
    }

    #[test]
    fn test_stability_and_neighbor_colors() {
        // path 0-1-2
        let graph = Graph::from_edges(3, &[(0, 1), (1, 2)], false).unwrap();

        let uniform = colors(&[0, 0, 0]);
        assert!(!uniform.is_stable(&graph));

        let by_degree = colors(&[0, 1, 0]);
        assert!(by_degree.is_stable(&graph));
        assert_eq!(by_degree.neighbor_colors(&graph, NodeId(1)), BTreeMap::from([(Color(0), 2)]));
    }

    #[test]
    fn test_stability_sees_arc_direction() {
        // 0 -> 1 -> 2 -> 0 is stable under one color, 0 -> 1, 0 -> 2 is not
        let cycle = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)], true).unwrap();
        assert!(colors(&[0, 0, 0]).is_stable(&cycle));

        let fork = Graph::from_edges(3, &[(0, 1), (0, 2)], true).unwrap();
        assert!(!colors(&[0, 1, 1]).is_stable(&Graph::from_edges(3, &[(0, 1), (2, 1)], true).unwrap()));
        assert!(colors(&[0, 1, 1]).is_stable(&fork));
    }
}
