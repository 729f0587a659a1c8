//! CHROMATIC Algorithm Framework
//! Refinement, branching and search over colored graphs

pub mod traits;
pub mod graph;

pub use self::traits::*;
pub use self::graph::*;
