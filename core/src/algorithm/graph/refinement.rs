//! Color refinement (1-dimensional Weisfeiler-Leman)
//!
//! Computes the coarsest stable coloring refining an initial coloring. Two
//! schedules drive the same splitting primitive:
//!
//! - **From scratch**: full passes over every class until a pass splits
//!   nothing. Simple and self-contained; the search runs it at every node.
//! - **Incremental**: a worklist of dirty colors in the style of Hopcroft's
//!   partition refinement. Only classes touched by the popped color are
//!   examined, and the largest fragment of a split is left out of the
//!   worklist whenever its parent was already processed.
//!
//! # Confluence
//! The coarsest stable refinement is unique, so both schedules reach the
//! same partition for the same graph and initial coloring. Labels may
//! differ; classes never do.
//!
//! # Termination
//! Every split strictly increases the number of classes, which is bounded
//! by the vertex count.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use log::{debug, trace};
use serde::{Serialize, Deserialize};

use crate::algorithm::graph::coloring::Coloring;
use crate::algorithm::traits::NodeId;
use crate::data_structures::graph::{Color, Graph};

/// Which schedule drives the refinement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStrategy {
    #[default]
    FromScratch,
    Incremental,
}

/// Number of (outgoing, incoming) neighbors a vertex has inside one class
type Signature = (usize, usize);

/// Result of splitting one class
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassSplit {
    /// Label of the class before the split, kept by the largest fragment
    original: Color,
    /// Labels of the fragments other than the largest
    fresh: Vec<Color>,
}

/// Working partition: labels plus class membership lists
#[derive(Debug)]
struct Partition {
    labels: Vec<Color>,
    members: HashMap<Color, Vec<NodeId>>,
    next_color: Color,
}

impl Partition {
    fn new(labels: Vec<Color>, next_color: Color) -> Self {
        let mut members: HashMap<Color, Vec<NodeId>> = HashMap::new();
        for (index, &color) in labels.iter().enumerate() {
            members.entry(color).or_default().push(NodeId(index));
        }
        Self { labels, members, next_color }
    }

    /// Current labels in increasing order
    fn colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.members.keys().copied().collect();
        colors.sort_unstable();
        colors
    }

    fn allocate(&mut self) -> Color {
        let color = self.next_color;
        self.next_color = color.next();
        color
    }

    /// Signatures of every vertex with at least one neighbor colored `splitter`
    fn signatures(&self, graph: &Graph, splitter: Color) -> HashMap<NodeId, Signature> {
        let mut signatures: HashMap<NodeId, Signature> = HashMap::new();
        let Some(class) = self.members.get(&splitter) else {
            return signatures;
        };

        for &member in class {
            // w -> member: member is an outgoing neighbor of w
            for &w in graph.in_neighbors(member) {
                signatures.entry(w).or_default().0 += 1;
            }
            // member -> w: member is an incoming neighbor of w
            for &w in graph.neighbors(member) {
                signatures.entry(w).or_default().1 += 1;
            }
        }
        signatures
    }

    /// Splits every class touched by `splitter` according to how many
    /// neighbors its members have in `splitter`
    ///
    /// Signatures are computed once, before any class changes, so the
    /// splitter itself may be split in the same call.
    fn split_by(&mut self, graph: &Graph, splitter: Color) -> Vec<ClassSplit> {
        let signatures = self.signatures(graph, splitter);

        let touched: BTreeSet<Color> = signatures
            .keys()
            .map(|id| self.labels[id.0])
            .collect();

        let mut splits = Vec::new();
        for original in touched {
            let Some(class) = self.members.get(&original) else {
                continue;
            };

            let mut fragments: BTreeMap<Signature, Vec<NodeId>> = BTreeMap::new();
            for &id in class {
                let signature = signatures.get(&id).copied().unwrap_or_default();
                fragments.entry(signature).or_default().push(id);
            }

            if fragments.len() < 2 {
                continue;
            }

            // the largest fragment keeps the label; ties go to the smallest signature
            let mut keeper = 0;
            let mut largest = 0;
            for (index, fragment) in fragments.values().enumerate() {
                if fragment.len() > largest {
                    largest = fragment.len();
                    keeper = index;
                }
            }

            let mut fresh = Vec::with_capacity(fragments.len() - 1);
            for (index, fragment) in fragments.into_values().enumerate() {
                if index == keeper {
                    self.members.insert(original, fragment);
                    continue;
                }
                let color = self.allocate();
                for &id in &fragment {
                    self.labels[id.0] = color;
                }
                self.members.insert(color, fragment);
                fresh.push(color);
            }

            trace!(
                "split {} by {} into {} fragments",
                original,
                splitter,
                fresh.len() + 1
            );
            splits.push(ClassSplit { original, fresh });
        }
        splits
    }

    /// Every class holds vertices of a single (out, in) degree
    fn is_degree_uniform(&self, graph: &Graph) -> bool {
        self.members.values().all(|class| {
            let mut degrees = class.iter().map(|&id| (graph.degree(id), graph.in_degree(id)));
            match degrees.next() {
                Some(first) => degrees.all(|d| d == first),
                None => true,
            }
        })
    }

    fn finish(self, graph: &mut Graph) -> Coloring {
        graph.paint(&self.labels);
        Coloring::new(self.labels)
    }
}

/// Labels after the initial coloring, plus the first unused label
///
/// Uncolored vertices get a color keyed by their (out, in) degree, allocated
/// above every pre-assigned color in order of first occurrence.
fn initial_labels(graph: &Graph) -> (Vec<Color>, Color) {
    let mut next = graph.max_color().map_or(Color(0), Color::next);
    let mut by_degree: HashMap<Signature, Color> = HashMap::new();

    let labels = graph
        .vertices()
        .map(|vertex| match vertex.color {
            Some(color) => color,
            None => {
                let degree = (graph.degree(vertex.id), graph.in_degree(vertex.id));
                *by_degree.entry(degree).or_insert_with(|| {
                    let color = next;
                    next = next.next();
                    color
                })
            }
        })
        .collect();

    (labels, next)
}

/// Colors every uncolored vertex by degree and returns the first unused label
pub fn initial_coloring(graph: &mut Graph) -> Color {
    let (labels, next) = initial_labels(graph);
    graph.paint(&labels);
    next
}

/// From-scratch refinement: repeated full passes until nothing splits
pub fn refine(graph: &mut Graph) -> Coloring {
    let (labels, next) = initial_labels(graph);
    let mut partition = Partition::new(labels, next);
    let mut passes = 0usize;

    loop {
        passes += 1;
        let mut changed = false;
        for splitter in partition.colors() {
            if !partition.split_by(graph, splitter).is_empty() {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    debug!(
        "refinement converged after {} passes with {} classes over {} vertices",
        passes,
        partition.members.len(),
        partition.labels.len()
    );
    partition.finish(graph)
}

/// Incremental refinement driven by a worklist of dirty colors
pub fn refine_incremental(graph: &mut Graph) -> Coloring {
    let (labels, next) = initial_labels(graph);
    let mut partition = Partition::new(labels, next);

    let mut queue: VecDeque<Color> = VecDeque::new();
    let mut pending: HashSet<Color> = HashSet::new();

    // Stability against the whole vertex set lets the largest class wait,
    // which holds only when degrees are uniform inside every class.
    let deferred = if partition.is_degree_uniform(graph) {
        partition
            .members
            .iter()
            .max_by(|(ca, a), (cb, b)| a.len().cmp(&b.len()).then(cb.cmp(ca)))
            .map(|(&color, _)| color)
    } else {
        None
    };

    for color in partition.colors() {
        if Some(color) != deferred {
            queue.push_back(color);
            pending.insert(color);
        }
    }

    let mut pops = 0usize;
    while let Some(splitter) = queue.pop_front() {
        pending.remove(&splitter);
        pops += 1;

        for split in partition.split_by(graph, splitter) {
            // The largest fragment inherits the parent's label, so it stays
            // scheduled exactly when the parent was; every other fragment
            // is scheduled unconditionally.
            for color in split.fresh {
                if pending.insert(color) {
                    queue.push_back(color);
                }
            }
            trace!(
                "{} {} after split",
                split.original,
                if pending.contains(&split.original) { "remains pending" } else { "deferred" }
            );
        }
    }

    debug!(
        "incremental refinement converged after {} pops with {} classes over {} vertices",
        pops,
        partition.members.len(),
        partition.labels.len()
    );
    partition.finish(graph)
}

/// Runs the refinement selected by `strategy`
pub fn refine_with(graph: &mut Graph, strategy: RefinementStrategy) -> Coloring {
    match strategy {
        RefinementStrategy::FromScratch => refine(graph),
        RefinementStrategy::Incremental => refine_incremental(graph),
    }
}
