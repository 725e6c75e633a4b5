//! Model variants sharing the graph substrate.

use std::fmt;

/// Which model family a [`Network`](crate::Network) represents.
///
/// The variant decides the default states of new nodes, which tables are
/// populated, and whether self-loops are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Acyclic parent/child structure with a CPT per node.
    Bayesian,
    /// Nodes are chain states with outgoing transition tables.
    MarkovChain,
    /// Hidden states with transition and emission tables.
    Hmm,
}

impl ModelKind {
    /// Self-loops are only meaningful for state-transition models.
    pub fn allows_self_loops(self) -> bool {
        !matches!(self, ModelKind::Bayesian)
    }

    pub fn has_transitions(self) -> bool {
        matches!(self, ModelKind::MarkovChain | ModelKind::Hmm)
    }

    pub fn has_emissions(self) -> bool {
        matches!(self, ModelKind::Hmm)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Bayesian => write!(f, "Bayesian network"),
            ModelKind::MarkovChain => write!(f, "Markov chain"),
            ModelKind::Hmm => write!(f, "hidden Markov model"),
        }
    }
}
