//! Graph isomorphism by color refinement and individualization

pub mod coloring;
pub mod refinement;
pub mod branching;
pub mod isomorphism;
pub mod equivalence;

pub use self::coloring::{BalancePolicy, Coloring};
pub use self::refinement::{initial_coloring, refine, refine_incremental, refine_with, RefinementStrategy};
pub use self::branching::{BranchPoint, GraphPair, BRANCH_THRESHOLD};
pub use self::isomorphism::{
    count_automorphisms, count_isomorphisms, exists_isomorphism, GraphIsomorphism, IsomorphismError,
    IsomorphismResult, SearchMode, SearchStatistics,
};
pub use self::equivalence::{automorphism_counts, isomorphism_classes, BatchReport, EquivalenceClass};
