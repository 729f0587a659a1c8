//! Core algorithm trait definitions for the CHROMATIC isomorphism engine
//!
//! This module establishes the shared vocabulary of the crate: type-safe
//! vertex identifiers, the graph-level error taxonomy, and the parameter
//! system through which search algorithms are configured at runtime.
//!
//! # Key Design Principles
//! - Vertex identifiers are arena indices, never raw integers at API seams
//! - Every precondition violation surfaces as an `AlgorithmError`
//! - Parameters are validated against their declared type on assignment

use std::collections::HashMap;
use std::fmt;
use serde::{Serialize, Deserialize};

/// Node identifier ensuring type safety and preventing mixing with other numeric types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Shifts the identifier by `offset` positions (used when graphs are
    /// concatenated into a disjoint union)
    #[inline]
    pub fn offset(self, offset: usize) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Algorithm parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub description: String,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Integer,
    Boolean,
    Enum(Vec<String>),
}

impl ParameterType {
    /// Checks `value` against the declared type
    pub fn validate(&self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        let valid = match self {
            ParameterType::Integer => value.parse::<usize>().is_ok(),
            ParameterType::Boolean => matches!(value, "true" | "false"),
            ParameterType::Enum(allowed) => allowed.iter().any(|v| v == value),
        };

        if valid {
            Ok(())
        } else {
            Err(AlgorithmError::InvalidParameter {
                name: name.to_string(),
                reason: match self {
                    ParameterType::Integer => "must be a non-negative integer".to_string(),
                    ParameterType::Boolean => "must be 'true' or 'false'".to_string(),
                    ParameterType::Enum(allowed) => format!("must be one of {:?}", allowed),
                },
            })
        }
    }
}

/// Comprehensive error types for graph and parameter operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid node: {0}")]
    InvalidNode(NodeId),

    #[error("Duplicate edge: {0} -> {1}")]
    DuplicateEdge(NodeId, NodeId),

    #[error("Vertex {0} carries no color")]
    UncoloredVertex(NodeId),

    #[error("Invalid graph state: {0}")]
    InvalidGraph(String),
}

/// Configurable algorithm exposed through string parameters
///
/// # Invariants
/// - Shareable across threads once configured
/// - Runs never mutate the caller's graphs
/// - Results do not depend on how work is scheduled
pub trait Algorithm: fmt::Debug + Send + Sync {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g., graph_analysis)
    fn category(&self) -> &'static str;

    /// Returns the algorithm's formal description
    fn description(&self) -> String;

    /// Returns supported parameters with type information
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;

    /// Current parameter values keyed by name
    fn get_parameters(&self) -> HashMap<String, String> {
        self.parameters()
            .into_iter()
            .map(|p| (p.name, p.value))
            .collect()
    }
}
