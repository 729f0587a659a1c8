//! CHROMATIC: exact graph isomorphism and automorphism counting
//!
//! Two graphs are compared through their disjoint union. Color refinement
//! (1-dimensional Weisfeiler-Leman) splits the union's vertices into
//! classes; whenever refinement stalls, a vertex pair is individualized and
//! the search branches.
//!
//! ```
//! use chromatic_core::data_structures::generators;
//! use chromatic_core::{count_automorphisms, count_isomorphisms};
//!
//! let square = generators::cycle(4).unwrap();
//! assert_eq!(count_automorphisms(&square).unwrap(), 8);
//! assert_eq!(count_isomorphisms(&square, &generators::path(4).unwrap()).unwrap(), 0);
//! ```

pub mod algorithm;
pub mod config;
pub mod data_structures;

pub use crate::algorithm::graph::{
    count_automorphisms, count_isomorphisms, exists_isomorphism, BatchReport, GraphIsomorphism,
    IsomorphismError, IsomorphismResult, SearchMode,
};
pub use crate::algorithm::traits::{Algorithm, AlgorithmError, NodeId};
pub use crate::config::SearchConfig;
pub use crate::data_structures::graph::{Color, Graph};
