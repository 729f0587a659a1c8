//! Search configuration
//!
//! `SearchConfig` can be built in code, deserialized from JSON, or adjusted
//! one string parameter at a time through the `Algorithm` trait. Every field
//! has a default, so partial JSON documents are accepted.

use serde::{Serialize, Deserialize};

use crate::algorithm::graph::coloring::BalancePolicy;
use crate::algorithm::graph::isomorphism::IsomorphismError;
use crate::algorithm::graph::refinement::RefinementStrategy;
use crate::algorithm::traits::{AlgorithmError, AlgorithmParameter, ParameterType};

/// Tuning knobs for the individualization-refinement search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Dispatch sibling branches to the rayon pool
    pub parallel_search: bool,
    /// Branches are parallel only above this recursion depth
    pub parallel_depth: usize,
    /// Run incremental refinement once on the root pair before searching
    pub prerefine: bool,
    /// Balance check applied at every search node
    pub balance_policy: BalancePolicy,
    /// Refinement run at every search node
    pub refinement: RefinementStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            parallel_search: true,
            parallel_depth: 2,
            prerefine: true,
            balance_policy: BalancePolicy::ColorSet,
            refinement: RefinementStrategy::FromScratch,
        }
    }
}

const BALANCE_POLICIES: [&str; 2] = ["color_set", "color_multiset"];
const REFINEMENT_STRATEGIES: [&str; 2] = ["from_scratch", "incremental"];

impl SearchConfig {
    /// Default configuration with every branch explored on the calling thread
    pub fn sequential() -> Self {
        Self {
            parallel_search: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, IsomorphismError> {
        serde_json::from_str(json)
            .map_err(|e| IsomorphismError::InvalidParameter(format!("search configuration: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, IsomorphismError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| IsomorphismError::ComputationError(e.to_string()))
    }

    /// Whether children of a node at `depth` run on the rayon pool
    #[inline]
    pub fn parallel_at(&self, depth: usize) -> bool {
        self.parallel_search && depth < self.parallel_depth
    }

    /// Parameter table with current values
    pub fn parameters(&self) -> Vec<AlgorithmParameter> {
        let enumerated = |values: &[&str]| ParameterType::Enum(values.iter().map(|v| v.to_string()).collect());

        vec![
            AlgorithmParameter {
                name: "parallel_search".to_string(),
                value: self.parallel_search.to_string(),
                value_type: ParameterType::Boolean,
                description: "Explore sibling branches in parallel".to_string(),
            },
            AlgorithmParameter {
                name: "parallel_depth".to_string(),
                value: self.parallel_depth.to_string(),
                value_type: ParameterType::Integer,
                description: "Recursion depth below which branches stay sequential".to_string(),
            },
            AlgorithmParameter {
                name: "prerefine".to_string(),
                value: self.prerefine.to_string(),
                value_type: ParameterType::Boolean,
                description: "Refine the root pair incrementally before searching".to_string(),
            },
            AlgorithmParameter {
                name: "balance_policy".to_string(),
                value: policy_name(self.balance_policy).to_string(),
                value_type: enumerated(&BALANCE_POLICIES[..]),
                description: "Compare color sets or color multisets of both graphs".to_string(),
            },
            AlgorithmParameter {
                name: "refinement".to_string(),
                value: strategy_name(self.refinement).to_string(),
                value_type: enumerated(&REFINEMENT_STRATEGIES[..]),
                description: "Refinement schedule used at every search node".to_string(),
            },
        ]
    }

    /// Validates and applies one string parameter
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        let parameter = self
            .parameters()
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| AlgorithmError::InvalidParameter {
                name: name.to_string(),
                reason: "unknown parameter".to_string(),
            })?;
        parameter.value_type.validate(name, value)?;

        match name {
            "parallel_search" => self.parallel_search = value == "true",
            "prerefine" => self.prerefine = value == "true",
            "parallel_depth" => {
                self.parallel_depth = value.parse().map_err(|_| AlgorithmError::InvalidParameter {
                    name: name.to_string(),
                    reason: "out of range".to_string(),
                })?
            }
            "balance_policy" => {
                self.balance_policy = if value == "color_multiset" {
                    BalancePolicy::ColorMultiset
                } else {
                    BalancePolicy::ColorSet
                }
            }
            _ => {
                self.refinement = if value == "incremental" {
                    RefinementStrategy::Incremental
                } else {
                    RefinementStrategy::FromScratch
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.parameters()
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }
}

fn policy_name(policy: BalancePolicy) -> &'static str {
    match policy {
        BalancePolicy::ColorSet => BALANCE_POLICIES[0],
        BalancePolicy::ColorMultiset => BALANCE_POLICIES[1],
    }
}

fn strategy_name(strategy: RefinementStrategy) -> &'static str {
    match strategy {
        RefinementStrategy::FromScratch => REFINEMENT_STRATEGIES[0],
        RefinementStrategy::Incremental => REFINEMENT_STRATEGIES[1],
    }
}
