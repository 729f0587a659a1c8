//! Graph containers consumed by the refinement and search engines

pub mod graph;
pub mod generators;

pub use self::graph::{Color, Graph, Vertex};
