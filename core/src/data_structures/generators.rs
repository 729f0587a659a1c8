//! Standard graph families
//!
//! Small, well-understood graphs with known automorphism group orders. They
//! serve as fixtures for tests and benchmarks and as building blocks for
//! callers assembling batches.

use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::graph::Graph;

/// Cycle C_n (n ≥ 3)
pub fn cycle(n: usize) -> Result<Graph, AlgorithmError> {
    if n < 3 {
        return Err(AlgorithmError::InvalidGraph(format!("a cycle needs at least 3 vertices, got {}", n)));
    }
    let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    Graph::from_edges(n, &edges, false)
}

/// Path P_n on `n` vertices
pub fn path(n: usize) -> Result<Graph, AlgorithmError> {
    let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
    Graph::from_edges(n, &edges, false)
}

/// Star K_{1,leaves}: vertex 0 is the center
pub fn star(leaves: usize) -> Result<Graph, AlgorithmError> {
    let edges: Vec<_> = (1..=leaves).map(|i| (0, i)).collect();
    Graph::from_edges(leaves + 1, &edges, false)
}

/// Complete graph K_n
pub fn complete(n: usize) -> Result<Graph, AlgorithmError> {
    let edges: Vec<_> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();
    Graph::from_edges(n, &edges, false)
}

/// Hypercube Q_d on 2^d vertices
pub fn hypercube(dimension: u32) -> Result<Graph, AlgorithmError> {
    let n = 1usize.checked_shl(dimension).ok_or_else(|| {
        AlgorithmError::InvalidGraph(format!("hypercube dimension {} exceeds {} bits", dimension, usize::BITS))
    })?;
    let edges: Vec<_> = (0..n)
        .flat_map(|v| {
            (0..dimension)
                .map(move |bit| (v, v ^ (1 << bit)))
                .filter(|&(v, w)| v < w)
        })
        .collect();
    Graph::from_edges(n, &edges, false)
}

/// Directed cycle on `n` vertices
pub fn directed_cycle(n: usize) -> Result<Graph, AlgorithmError> {
    let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    Graph::from_edges(n, &edges, true)
}

/// Disjoint union of `copies` copies of `graph`
pub fn disjoint_copies(graph: &Graph, copies: usize) -> Result<Graph, AlgorithmError> {
    Graph::union_all(&vec![graph.clone(); copies])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::traits::NodeId;

    #[test]
    fn test_family_sizes() {
        let c5 = cycle(5).unwrap();
        assert_eq!((c5.vertex_count(), c5.edge_count()), (5, 5));

        let p4 = path(4).unwrap();
        assert_eq!((p4.vertex_count(), p4.edge_count()), (4, 3));

        let k13 = star(3).unwrap();
        assert_eq!(k13.degree(NodeId(0)), 3);

        let k5 = complete(5).unwrap();
        assert_eq!(k5.edge_count(), 10);

        let q3 = hypercube(3).unwrap();
        assert_eq!((q3.vertex_count(), q3.edge_count()), (8, 12));
        assert!(q3.node_ids().all(|v| q3.degree(v) == 3));

        let dc = directed_cycle(4).unwrap();
        assert!(dc.is_directed());
        assert!(dc.node_ids().all(|v| dc.degree(v) == 1 && dc.in_degree(v) == 1));

        let two_triangles = disjoint_copies(&cycle(3).unwrap(), 2).unwrap();
        assert_eq!(two_triangles.vertex_count(), 6);
        assert!(!two_triangles.has_edge(NodeId(2), NodeId(3)));
    }

    #[test]
    fn test_oversized_hypercube_is_rejected() {
        assert!(matches!(hypercube(usize::BITS), Err(AlgorithmError::InvalidGraph(_))));
        assert!(matches!(hypercube(u32::MAX), Err(AlgorithmError::InvalidGraph(_))));
        assert_eq!(hypercube(0).unwrap().vertex_count(), 1);
    }

    #[test]
    fn test_degenerate_cycle_rejected() {
        assert!(cycle(2).is_err());
        assert_eq!(path(0).unwrap().vertex_count(), 0);
    }
}
