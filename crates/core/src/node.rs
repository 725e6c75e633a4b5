//! # Nodes
//!
//! One node is one random variable (Bayesian network), one chain state
//! (Markov chain) or one hidden state (HMM). Adjacency is stored as lists of
//! node ids; the owning [`Network`](crate::Network) keeps both directions in
//! sync, so the fields are read-only from outside the crate.

use std::collections::HashMap;

/// CPT row key for a node without parents.
pub const ROOT_KEY: &str = "root";

/// Separator between parent states in a CPT row key.
pub const KEY_SEPARATOR: &str = "_";

/// Default states of a Bayesian variable.
pub const DEFAULT_STATES: [&str; 2] = ["True", "False"];

/// A distribution over labels: state → probability, destination → probability,
/// or observation → probability.
pub type ProbTable = HashMap<String, f64>;

/// Conditional probability table: parent-combination key → row.
pub type Cpt = HashMap<String, ProbTable>;

/// Build the CPT row key for a combination of parent states.
///
/// Parentless nodes use [`ROOT_KEY`]; otherwise the parent states are joined
/// with [`KEY_SEPARATOR`] in parent-declaration order.
///
/// ```rust
/// use probgraph_core::row_key;
///
/// assert_eq!(row_key::<&str>(&[]), "root");
/// assert_eq!(row_key(&["True", "False"]), "True_False");
/// ```
pub fn row_key<S: AsRef<str>>(parent_states: &[S]) -> String {
    if parent_states.is_empty() {
        return ROOT_KEY.to_string();
    }
    parent_states
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// A node of the labeled graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: String,
    /// Display label, not required to be unique.
    pub name: String,
    pub(crate) states: Vec<String>,
    pub(crate) parents: Vec<String>,
    pub(crate) children: Vec<String>,
    pub(crate) cpt: Cpt,
    pub(crate) transitions: Option<ProbTable>,
    pub(crate) emissions: Option<ProbTable>,
}

impl Node {
    pub(crate) fn new(id: String, name: String, states: Vec<String>) -> Self {
        Self {
            id,
            name,
            states,
            parents: Vec::new(),
            children: Vec::new(),
            cpt: Cpt::new(),
            transitions: None,
            emissions: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordered state labels.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Parent ids in declaration order. CPT keys follow this order.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn cpt(&self) -> &Cpt {
        &self.cpt
    }

    /// Outgoing transition table, if this node has one.
    pub fn transitions(&self) -> Option<&ProbTable> {
        self.transitions.as_ref()
    }

    /// Emission table, if this node has one.
    pub fn emissions(&self) -> Option<&ProbTable> {
        self.emissions.as_ref()
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    pub fn state_index(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }

    /// `P(self = state | row)`; `None` when the row or the entry is absent.
    pub fn cpt_entry(&self, key: &str, state: &str) -> Option<f64> {
        self.cpt.get(key).and_then(|row| row.get(state)).copied()
    }

    /// Transition probability towards `destination`; `None` when not declared.
    pub fn transition_to(&self, destination: &str) -> Option<f64> {
        self.transitions
            .as_ref()
            .and_then(|t| t.get(destination))
            .copied()
    }

    /// Emission probability of `observation`; `None` when not declared.
    pub fn emission(&self, observation: &str) -> Option<f64> {
        self.emissions
            .as_ref()
            .and_then(|e| e.get(observation))
            .copied()
    }

    /// Sum of the declared outgoing transitions (0 when there are none).
    pub fn transition_sum(&self) -> f64 {
        self.transitions
            .as_ref()
            .map(|t| t.values().sum())
            .unwrap_or(0.0)
    }
}
