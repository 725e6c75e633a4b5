//! Error types for inference.

use probgraph_core::{GraphError, ModelKind};
use thiserror::Error;

/// Errors that can occur while running an inference algorithm.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbError {
    /// The graph model rejected an operation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A query or evidence references a node that does not exist.
    #[error("Unknown variable: {id}")]
    UnknownVariable { id: String },

    /// Evidence assigns a state the node does not declare.
    #[error("Variable {node} has no state {state:?}")]
    UnknownState { node: String, state: String },

    /// A CPT row or entry needed by the computation is not defined.
    #[error("Undefined probability for {node} given {key}")]
    MissingCptEntry { node: String, key: String },

    /// The algorithm needs at least one node.
    #[error("Network has no nodes")]
    EmptyNetwork,

    /// The algorithm does not apply to this kind of model.
    #[error("Expected a {expected}, got a {actual}")]
    ModelMismatch {
        expected: ModelKind,
        actual: ModelKind,
    },

    /// Power iteration stopped at its cap before converging.
    #[error("Did not converge after {iterations} iterations (residual {residual:.3e})")]
    NonConvergent { iterations: usize, residual: f64 },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
