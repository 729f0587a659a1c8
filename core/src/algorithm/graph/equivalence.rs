//! Batch analysis over collections of graphs
//!
//! Splits a batch into isomorphism classes and reports automorphism group
//! orders, either as plain vectors or as a serializable `BatchReport`.

use log::debug;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::algorithm::graph::isomorphism::{GraphIsomorphism, IsomorphismError};
use crate::data_structures::graph::Graph;

/// Partitions `graphs` into isomorphism classes of batch indices
///
/// Each graph is tested against the first member of every class found so
/// far and joins the first one it matches. Classes appear in order of their
/// first member. Graphs of different directedness never share a class.
pub fn isomorphism_classes(
    iso: &GraphIsomorphism,
    graphs: &[Graph],
) -> Result<Vec<Vec<usize>>, IsomorphismError> {
    let mut classes: Vec<Vec<usize>> = Vec::new();

    'graphs: for (index, graph) in graphs.iter().enumerate() {
        for class in classes.iter_mut() {
            let representative = &graphs[class[0]];
            if representative.is_directed() == graph.is_directed()
                && iso.exists_isomorphism(representative, graph)?
            {
                class.push(index);
                continue 'graphs;
            }
        }
        classes.push(vec![index]);
    }

    debug!("{} graphs fall into {} isomorphism classes", graphs.len(), classes.len());
    Ok(classes)
}

/// Automorphism group order of every graph, computed in parallel
pub fn automorphism_counts(iso: &GraphIsomorphism, graphs: &[Graph]) -> Result<Vec<u64>, IsomorphismError> {
    graphs.par_iter().map(|graph| iso.count_automorphisms(graph)).collect()
}

/// One isomorphism class of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceClass {
    /// Batch indices, ascending
    pub members: Vec<usize>,
    /// Automorphism group order shared by every member
    pub automorphisms: Option<u64>,
}

/// Isomorphism classes of a batch of graphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub graph_count: usize,
    pub classes: Vec<EquivalenceClass>,
}

impl BatchReport {
    /// Classifies `graphs`; with `include_automorphisms` each class also
    /// carries the automorphism count of its first member
    pub fn analyze(
        iso: &GraphIsomorphism,
        graphs: &[Graph],
        include_automorphisms: bool,
    ) -> Result<Self, IsomorphismError> {
        let classes = isomorphism_classes(iso, graphs)?
            .into_par_iter()
            .map(|members| -> Result<EquivalenceClass, IsomorphismError> {
                let automorphisms = if include_automorphisms {
                    Some(iso.count_automorphisms(&graphs[members[0]])?)
                } else {
                    None
                };
                Ok(EquivalenceClass { members, automorphisms })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            graph_count: graphs.len(),
            classes,
        })
    }

    /// Class holding the graph at `index`
    pub fn class_of(&self, index: usize) -> Option<&EquivalenceClass> {
        self.classes.iter().find(|class| class.members.contains(&index))
    }

    pub fn to_json(&self) -> Result<String, IsomorphismError> {
        serde_json::to_string_pretty(self).map_err(|e| IsomorphismError::ComputationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::data_structures::generators;

    fn batch() -> Vec<Graph> {
        vec![
            generators::cycle(4).unwrap(),
            generators::path(4).unwrap(),
            Graph::from_edges(4, &[(0, 2), (2, 1), (1, 3), (3, 0)], false).unwrap(),
            generators::star(3).unwrap(),
            Graph::from_edges(4, &[(3, 0), (0, 2), (2, 1)], false).unwrap(),
            generators::directed_cycle(4).unwrap(),
        ]
    }

    #[test]
    fn test_isomorphism_classes() {
        let iso = GraphIsomorphism::with_config(SearchConfig::sequential());
        let classes = isomorphism_classes(&iso, &batch()).unwrap();
        assert_eq!(classes, vec![vec![0, 2], vec![1, 4], vec![3], vec![5]]);

        assert!(isomorphism_classes(&iso, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_automorphism_counts() {
        let iso = GraphIsomorphism::new();
        assert_eq!(automorphism_counts(&iso, &batch()).unwrap(), vec![8, 2, 8, 6, 2, 4]);
    }

    #[test]
    fn test_batch_report() {
        let iso = GraphIsomorphism::new();
        let report = BatchReport::analyze(&iso, &batch(), true).unwrap();

        assert_eq!(report.graph_count, 6);
        assert_eq!(report.classes.len(), 4);
        assert_eq!(
            report.class_of(4),
            Some(&EquivalenceClass { members: vec![1, 4], automorphisms: Some(2) })
        );
        assert_eq!(report.class_of(5).and_then(|c| c.automorphisms), Some(4));
        assert_eq!(report.class_of(9), None);

        let json = report.to_json().unwrap();
        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);

        let bare = BatchReport::analyze(&iso, &batch(), false).unwrap();
        assert!(bare.classes.iter().all(|c| c.automorphisms.is_none()));
    }
}
