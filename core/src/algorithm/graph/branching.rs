//! Branch selection and individualization
//!
//! When refinement stalls on a balanced, non-discrete coloring of a graph
//! pair, the search picks a color class, fixes a pivot vertex of the first
//! graph in it, and tries every unmatched vertex of the second graph with
//! the same color as the pivot's partner. Individualizing both vertices with
//! one fresh color forces every isomorphism found below to map pivot to
//! partner.

use std::collections::HashMap;
use std::ops::Range;

use crate::algorithm::graph::coloring::Coloring;
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Color, Graph};

/// Minimum number of occurrences, counted across both graphs, for a color
/// class to be branched on
pub const BRANCH_THRESHOLD: usize = 4;

/// Matched (first graph, second graph) vertices, in union coordinates
pub type Correspondence = Vec<(NodeId, NodeId)>;

/// Two graphs held as one disjoint union: vertices `0..left_len` belong to
/// the first graph, the rest to the second
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPair {
    union: Graph,
    left_len: usize,
}

impl GraphPair {
    pub fn new(left: &Graph, right: &Graph) -> Result<Self, AlgorithmError> {
        Ok(Self {
            union: left.disjoint_union(right)?,
            left_len: left.vertex_count(),
        })
    }

    #[inline]
    pub fn union(&self) -> &Graph {
        &self.union
    }

    #[inline]
    pub fn union_mut(&mut self) -> &mut Graph {
        &mut self.union
    }

    #[inline]
    pub fn left_len(&self) -> usize {
        self.left_len
    }

    #[inline]
    pub fn right_len(&self) -> usize {
        self.union.vertex_count() - self.left_len
    }

    #[inline]
    pub fn left_range(&self) -> Range<usize> {
        0..self.left_len
    }

    #[inline]
    pub fn right_range(&self) -> Range<usize> {
        self.left_len..self.union.vertex_count()
    }

    /// Position of a second-graph vertex inside the union
    #[inline]
    pub fn right_node(&self, local: NodeId) -> NodeId {
        local.offset(self.left_len)
    }

    #[inline]
    pub fn is_left(&self, id: NodeId) -> bool {
        id.0 < self.left_len
    }

    #[inline]
    pub fn is_right(&self, id: NodeId) -> bool {
        !self.is_left(id) && self.union.contains(id)
    }
}

/// Where the search splits next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPoint {
    /// Class being split
    pub color: Color,
    /// First unmatched vertex of the first graph in that class
    pub pivot: NodeId,
    /// Fresh label for the individualized pair
    pub next_color: Color,
}

/// Chooses the class to branch on
///
/// Vertices are scanned in union order (first graph, then second) with a
/// running count per color; the first color to reach `BRANCH_THRESHOLD`
/// wins. `Ok(None)` means no class is large enough, which on a balanced,
/// non-discrete pair implies mismatched class sizes.
pub fn select_branch(
    coloring: &Coloring,
    pair: &GraphPair,
    matched: &[(NodeId, NodeId)],
) -> Result<Option<BranchPoint>, AlgorithmError> {
    let mut occurrences: HashMap<Color, usize> = HashMap::new();
    let mut selected = None;

    for &color in coloring.labels() {
        let count = occurrences.entry(color).or_insert(0);
        *count += 1;
        if *count >= BRANCH_THRESHOLD {
            selected = Some(color);
            break;
        }
    }

    let Some(color) = selected else {
        return Ok(None);
    };

    let pivot = pair
        .left_range()
        .map(NodeId)
        .find(|&id| coloring.color(id) == color && !matched.iter().any(|&(x, _)| x == id))
        .ok_or_else(|| {
            AlgorithmError::InvalidGraph(format!(
                "class {} has no unmatched vertex in the first graph",
                color
            ))
        })?;

    Ok(Some(BranchPoint {
        color,
        pivot,
        next_color: coloring.next_color(),
    }))
}

/// Unmatched second-graph vertices colored `color`, in sequence order
pub fn candidates(
    coloring: &Coloring,
    pair: &GraphPair,
    matched: &[(NodeId, NodeId)],
    color: Color,
) -> Vec<NodeId> {
    pair.right_range()
        .map(NodeId)
        .filter(|&id| coloring.color(id) == color && !matched.iter().any(|&(_, y)| y == id))
        .collect()
}

/// Independent copy of `pair` with `pivot` and `partner` painted `fresh`
pub fn individualize(
    pair: &GraphPair,
    pivot: NodeId,
    partner: NodeId,
    fresh: Color,
) -> Result<GraphPair, AlgorithmError> {
    if !pair.is_left(pivot) {
        return Err(AlgorithmError::InvalidNode(pivot));
    }
    if !pair.is_right(partner) {
        return Err(AlgorithmError::InvalidNode(partner));
    }

    let mut child = pair.clone();
    child.union.set_color(pivot, fresh)?;
    child.union.set_color(partner, fresh)?;
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::refinement::refine;
    use crate::data_structures::generators;

    fn refined_pair(left: &Graph, right: &Graph) -> (GraphPair, Coloring) {
        let mut pair = GraphPair::new(left, right).unwrap();
        let coloring = refine(pair.union_mut());
        (pair, coloring)
    }

    fn singletons(pair: &GraphPair, coloring: &Coloring) -> usize {
        coloring.singleton_count(pair.left_range()) + coloring.singleton_count(pair.right_range())
    }

    #[test]
    fn test_pair_geometry() {
        let pair = GraphPair::new(&generators::cycle(3).unwrap(), &generators::path(2).unwrap()).unwrap();
        assert_eq!(pair.left_len(), 3);
        assert_eq!(pair.right_len(), 2);
        assert_eq!(pair.right_node(NodeId(1)), NodeId(4));
        assert!(pair.is_left(NodeId(2)));
        assert!(pair.is_right(NodeId(3)));
        assert!(!pair.is_right(NodeId(5)));
    }

    #[test]
    fn test_select_on_two_triangles() {
        let triangle = generators::cycle(3).unwrap();
        let (pair, coloring) = refined_pair(&triangle, &triangle);

        let branch = select_branch(&coloring, &pair, &[]).unwrap().unwrap();
        assert_eq!(branch.pivot, NodeId(0));
        assert_eq!(branch.color, coloring.color(NodeId(0)));
        assert_eq!(branch.next_color, coloring.next_color());
        assert_eq!(
            candidates(&coloring, &pair, &[], branch.color),
            vec![NodeId(3), NodeId(4), NodeId(5)]
        );
    }

    #[test]
    fn test_matched_vertices_are_skipped() {
        let coloring = Coloring::new(vec![Color(1); 8]);
        let pair = GraphPair::new(&Graph::with_vertices(4, false), &Graph::with_vertices(4, false)).unwrap();
        let matched = vec![(NodeId(0), NodeId(5))];

        let branch = select_branch(&coloring, &pair, &matched).unwrap().unwrap();
        assert_eq!(branch.pivot, NodeId(1));
        assert_eq!(branch.next_color, Color(2));
        assert_eq!(
            candidates(&coloring, &pair, &matched, Color(1)),
            vec![NodeId(4), NodeId(6), NodeId(7)]
        );
    }

    #[test]
    fn test_threshold_not_reached() {
        // class sizes (2, 1) never reach four occurrences
        let pair = GraphPair::new(&Graph::with_vertices(3, false), &Graph::with_vertices(2, false)).unwrap();
        let coloring = Coloring::new(vec![Color(0), Color(1), Color(1), Color(0), Color(1)]);
        assert_eq!(select_branch(&coloring, &pair, &[]).unwrap(), None);
    }

    #[test]
    fn test_first_class_to_reach_threshold_wins() {
        let pair = GraphPair::new(&Graph::with_vertices(4, false), &Graph::with_vertices(4, false)).unwrap();
        // color 3 reaches four occurrences before color 2 does
        let raw = [2, 3, 3, 2, 3, 3, 2, 2];
        let coloring = Coloring::new(raw.iter().map(|&c| Color(c)).collect());
        let branch = select_branch(&coloring, &pair, &[]).unwrap().unwrap();
        assert_eq!(branch.color, Color(3));
        assert_eq!(branch.pivot, NodeId(1));
    }

    #[test]
    fn test_exhausted_class_is_a_precondition_violation() {
        let pair = GraphPair::new(&Graph::with_vertices(2, false), &Graph::with_vertices(2, false)).unwrap();
        let coloring = Coloring::new(vec![Color(5); 4]);
        let matched = vec![(NodeId(0), NodeId(2)), (NodeId(1), NodeId(3))];
        assert!(matches!(
            select_branch(&coloring, &pair, &matched),
            Err(AlgorithmError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_individualize_leaves_parent_untouched() {
        let square = generators::cycle(4).unwrap();
        let (pair, coloring) = refined_pair(&square, &square);
        let fresh = coloring.next_color();

        let child = individualize(&pair, NodeId(0), NodeId(5), fresh).unwrap();
        assert_eq!(child.union().color(NodeId(0)), Some(fresh));
        assert_eq!(child.union().color(NodeId(5)), Some(fresh));
        assert_eq!(pair.union().color(NodeId(0)), Some(coloring.color(NodeId(0))));

        assert!(individualize(&pair, NodeId(5), NodeId(0), fresh).is_err());
        assert!(individualize(&pair, NodeId(0), NodeId(8), fresh).is_err());
    }

    #[test]
    fn test_singletons_grow_along_a_branch_path() {
        let cube = generators::hypercube(3).unwrap();
        let (mut pair, mut coloring) = refined_pair(&cube, &cube);
        let mut matched: Correspondence = Vec::new();

        while let Some(branch) = select_branch(&coloring, &pair, &matched).unwrap() {
            let before = singletons(&pair, &coloring);
            let partner = candidates(&coloring, &pair, &matched, branch.color)[0];

            pair = individualize(&pair, branch.pivot, partner, branch.next_color).unwrap();
            matched.push((branch.pivot, partner));
            coloring = refine(pair.union_mut());

            assert!(singletons(&pair, &coloring) > before);
        }

        assert!(coloring.is_discrete(pair.left_range()));
        assert!(coloring.is_discrete(pair.right_range()));
        assert!(matched.len() <= cube.vertex_count());
    }
}
