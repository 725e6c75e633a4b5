//! # Error Types
//!
//! Errors raised while building or reading a network. Every lookup that can
//! fail reports *why* it failed, so a stored probability of `0.0` is never
//! confused with an entry that was never defined.

use thiserror::Error;

/// Errors for the graph model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// No node is registered under this id.
    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    /// A node with this id is already registered.
    #[error("Node already exists: {id}")]
    DuplicateNode { id: String },

    /// Self-loops are rejected for this kind of model.
    #[error("Self-loop on {id} is not allowed in a Bayesian network")]
    SelfLoop { id: String },

    /// The parent/child structure contains a directed cycle.
    #[error("Cycle detected through node {id}")]
    CycleDetected { id: String },

    /// A state label that the node does not declare.
    #[error("Node {node} has no state {state:?}")]
    UnknownState { node: String, state: String },

    /// The CPT has no row for this parent combination, or the row has no
    /// entry for the requested state.
    #[error("CPT entry not found for {node}: {key}")]
    MissingCptEntry { node: String, key: String },

    /// A stored probability must be finite and within `[0, 1]`.
    #[error("Invalid probability for {node}: {value}")]
    InvalidProbability { node: String, value: f64 },
}
