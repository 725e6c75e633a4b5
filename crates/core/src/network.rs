//! # Networks - Id-Indexed Node Tables
//!
//! A network owns its nodes in insertion order and indexes them by id.
//! Edges are adjacency lists of ids kept symmetric on both endpoints:
//! `A ∈ n.parents ⇔ n ∈ A.children`.
//!
//! Structural questions (topological order, reachability) are answered by
//! projecting the table onto a `petgraph` [`DiGraph`] whose node indices are
//! the insertion positions.

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

use crate::error::GraphError;
use crate::model::ModelKind;
use crate::node::{row_key, Cpt, Node, ProbTable, DEFAULT_STATES};

/// A (partial) assignment of states to node ids.
pub type Assignment = HashMap<String, String>;

/// A labeled graph holding one Bayesian network, Markov chain or HMM.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    kind: ModelKind,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl Network {
    /// Create an empty network of the given kind.
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Like [`node`](Self::node), but unknown ids are an error.
    pub fn get(&self, id: &str) -> Result<&Node, GraphError> {
        self.node(id)
            .ok_or_else(|| GraphError::UnknownNode { id: id.to_string() })
    }

    /// Insertion position of a node.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Node, GraphError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(GraphError::UnknownNode { id: id.to_string() }),
        }
    }

    /// Register a node with the default states for this kind of network.
    ///
    /// Bayesian variables default to `["True", "False"]`; chain and hidden
    /// states use their own id as their only state.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<&mut Node, GraphError> {
        let id = id.into();
        let states = match self.kind {
            ModelKind::Bayesian => DEFAULT_STATES.iter().map(|s| s.to_string()).collect(),
            ModelKind::MarkovChain | ModelKind::Hmm => vec![id.clone()],
        };
        self.add_node_with_states(id, name, states)
    }

    /// Register a node with explicit states.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`] if the id is already taken.
    pub fn add_node_with_states<S: Into<String>>(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        states: impl IntoIterator<Item = S>,
    ) -> Result<&mut Node, GraphError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateNode { id });
        }

        let mut node = Node::new(
            id.clone(),
            name.into(),
            states.into_iter().map(Into::into).collect(),
        );
        if self.kind.has_transitions() {
            node.transitions = Some(ProbTable::new());
        }
        if self.kind.has_emissions() {
            node.emissions = Some(ProbTable::new());
        }

        let position = self.nodes.len();
        self.index.insert(id, position);
        self.nodes.push(node);
        Ok(&mut self.nodes[position])
    }

    /// Remove a node and every edge touching it.
    ///
    /// Transition tables of the remaining nodes keep no entry towards the
    /// removed node.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| GraphError::UnknownNode { id: id.to_string() })?;
        let removed = self.nodes.remove(position);

        for node in &mut self.nodes {
            node.parents.retain(|p| p != id);
            node.children.retain(|c| c != id);
            if let Some(transitions) = node.transitions.as_mut() {
                transitions.remove(id);
            }
        }
        for (i, node) in self.nodes.iter().enumerate().skip(position) {
            self.index.insert(node.id.clone(), i);
        }

        debug!(node = id, remaining = self.nodes.len(), "removed node");
        Ok(removed)
    }

    /// Add the edge `parent → child` if it is not already present.
    ///
    /// Self-loops are accepted here; rejecting them for Bayesian networks is
    /// an editing policy (see `Session::connect` in the inference crate).
    pub fn connect(&mut self, parent: &str, child: &str) -> Result<(), GraphError> {
        let p = self.position_or_err(parent)?;
        let c = self.position_or_err(child)?;

        if self.nodes[c].parents.iter().any(|x| x == parent) {
            return Ok(());
        }
        self.nodes[c].parents.push(parent.to_string());
        self.nodes[p].children.push(child.to_string());
        Ok(())
    }

    /// Remove the edge `parent → child`. Returns whether an edge was removed.
    pub fn disconnect(&mut self, parent: &str, child: &str) -> Result<bool, GraphError> {
        let p = self.position_or_err(parent)?;
        let c = self.position_or_err(child)?;

        let before = self.nodes[c].parents.len();
        self.nodes[c].parents.retain(|x| x != parent);
        self.nodes[p].children.retain(|x| x != child);
        Ok(self.nodes[c].parents.len() != before)
    }

    fn position_or_err(&self, id: &str) -> Result<usize, GraphError> {
        self.position(id)
            .ok_or_else(|| GraphError::UnknownNode { id: id.to_string() })
    }

    /// Replace a node's whole CPT.
    pub fn set_cpt(&mut self, id: &str, cpt: Cpt) -> Result<(), GraphError> {
        let node = self.get_mut(id)?;
        for row in cpt.values() {
            check_states(node, row)?;
            check_table(id, row)?;
        }
        node.cpt = cpt;
        Ok(())
    }

    /// Set one CPT row, keyed by parent states in declaration order.
    pub fn set_cpt_row<S: AsRef<str>>(
        &mut self,
        id: &str,
        parent_states: &[S],
        row: ProbTable,
    ) -> Result<(), GraphError> {
        let node = self.get_mut(id)?;
        check_states(node, &row)?;
        check_table(id, &row)?;
        node.cpt.insert(row_key(parent_states), row);
        Ok(())
    }

    /// Set a two-state row from `P(True)`, storing `False = 1 - p`.
    pub fn set_binary_cpt_row<S: AsRef<str>>(
        &mut self,
        id: &str,
        parent_states: &[S],
        p_true: f64,
    ) -> Result<(), GraphError> {
        check_probability(id, p_true)?;
        let [t, f] = DEFAULT_STATES;
        let row = ProbTable::from([(t.to_string(), p_true), (f.to_string(), 1.0 - p_true)]);
        self.set_cpt_row(id, parent_states, row)
    }

    /// Set the probability of moving from `from` to `to`.
    pub fn set_transition(&mut self, from: &str, to: &str, p: f64) -> Result<(), GraphError> {
        self.position_or_err(to)?;
        check_probability(from, p)?;
        let node = self.get_mut(from)?;
        node.transitions
            .get_or_insert_with(ProbTable::new)
            .insert(to.to_string(), p);
        Ok(())
    }

    /// Set the probability that hidden state `id` emits `observation`.
    pub fn set_emission(
        &mut self,
        id: &str,
        observation: impl Into<String>,
        p: f64,
    ) -> Result<(), GraphError> {
        check_probability(id, p)?;
        let node = self.get_mut(id)?;
        node.emissions
            .get_or_insert_with(ProbTable::new)
            .insert(observation.into(), p);
        Ok(())
    }

    /// Replace a hidden state's whole emission table.
    pub fn set_emissions(&mut self, id: &str, emissions: ProbTable) -> Result<(), GraphError> {
        let node = self.get_mut(id)?;
        check_table(id, &emissions)?;
        node.emissions = Some(emissions);
        Ok(())
    }

    /// Replace a node's whole transition row. Destinations missing from
    /// `transitions` no longer have an entry.
    pub fn set_transitions(&mut self, id: &str, transitions: ProbTable) -> Result<(), GraphError> {
        if let Some(to) = transitions.keys().find(|to| !self.contains(to)) {
            return Err(GraphError::UnknownNode { id: to.clone() });
        }
        let node = self.get_mut(id)?;
        check_table(id, &transitions)?;
        node.transitions = Some(transitions);
        Ok(())
    }

    /// `P(node = state | parents)` where parent states are read from
    /// `assignment`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownNode`] for an unknown id.
    /// - [`GraphError::MissingCptEntry`] when the row or the entry is absent,
    ///   including when `assignment` lacks a parent. A stored `0.0` is
    ///   returned as `Ok(0.0)`.
    pub fn get_probability(
        &self,
        id: &str,
        state: &str,
        assignment: &Assignment,
    ) -> Result<f64, GraphError> {
        let node = self.get(id)?;
        let mut parent_states = Vec::with_capacity(node.parents.len());
        for parent in &node.parents {
            match assignment.get(parent) {
                Some(parent_state) => parent_states.push(parent_state.as_str()),
                None => {
                    return Err(GraphError::MissingCptEntry {
                        node: id.to_string(),
                        key: format!("{parent} unassigned"),
                    })
                }
            }
        }
        let key = row_key(&parent_states);

        node.cpt_entry(&key, state)
            .ok_or_else(|| GraphError::MissingCptEntry {
                node: id.to_string(),
                key,
            })
    }

    /// Project the node table onto a `petgraph` graph. Node index `i` is the
    /// node at insertion position `i`.
    pub fn graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), 0);
        for i in 0..self.nodes.len() {
            graph.add_node(i);
        }
        for (c, node) in self.nodes.iter().enumerate() {
            for parent in &node.parents {
                if let Some(&p) = self.index.get(parent) {
                    graph.add_edge(NodeIndex::new(p), NodeIndex::new(c), ());
                }
            }
        }
        graph
    }

    /// Node ids ordered so that every parent precedes its children.
    ///
    /// # Errors
    ///
    /// [`GraphError::CycleDetected`] if the structure is not a DAG
    /// (self-loops included).
    pub fn topological_order(&self) -> Result<Vec<&str>, GraphError> {
        let graph = self.graph();
        let order = toposort(&graph, None).map_err(|cycle| GraphError::CycleDetected {
            id: self.nodes[graph[cycle.node_id()]].id.clone(),
        })?;
        Ok(order
            .into_iter()
            .map(|ix| self.nodes[graph[ix]].id.as_str())
            .collect())
    }

    /// Whether adding `parent → child` would close a directed cycle.
    pub fn would_create_cycle(&self, parent: &str, child: &str) -> Result<bool, GraphError> {
        let p = self.position_or_err(parent)?;
        let c = self.position_or_err(child)?;
        if p == c {
            return Ok(true);
        }
        let graph = self.graph();
        Ok(has_path_connecting(
            &graph,
            NodeIndex::new(c),
            NodeIndex::new(p),
            None,
        ))
    }
}

fn check_probability(node: &str, value: f64) -> Result<(), GraphError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GraphError::InvalidProbability {
            node: node.to_string(),
            value,
        })
    }
}

fn check_table(node: &str, table: &ProbTable) -> Result<(), GraphError> {
    table.values().try_for_each(|&p| check_probability(node, p))
}

fn check_states(node: &Node, row: &ProbTable) -> Result<(), GraphError> {
    match row.keys().find(|s| !node.has_state(s)) {
        Some(state) => Err(GraphError::UnknownState {
            node: node.id.clone(),
            state: state.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ROOT_KEY;

    fn alarm_structure() -> Network {
        let mut net = Network::new(ModelKind::Bayesian);
        net.add_node("B", "Burglary").unwrap();
        net.add_node("E", "Earthquake").unwrap();
        net.add_node("A", "Alarm").unwrap();
        net.connect("B", "A").unwrap();
        net.connect("E", "A").unwrap();
        net
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut net = alarm_structure();
        let err = net.add_node("A", "Again").unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode { id: "A".into() });
    }

    #[test]
    fn test_default_states_per_kind() {
        let net = alarm_structure();
        assert_eq!(net.get("A").unwrap().states(), ["True", "False"]);

        let mut chain = Network::new(ModelKind::MarkovChain);
        chain.add_node("S", "Sunny").unwrap();
        let s = chain.get("S").unwrap();
        assert_eq!(s.states(), ["S"]);
        assert!(s.transitions().is_some());
        assert!(s.emissions().is_none());
    }

    #[test]
    fn test_connect_is_symmetric_and_idempotent() {
        let mut net = alarm_structure();
        net.connect("B", "A").unwrap();

        let a = net.get("A").unwrap();
        assert_eq!(a.parents(), ["B", "E"]);
        assert_eq!(net.get("B").unwrap().children(), ["A"]);
        assert_eq!(net.get("E").unwrap().children(), ["A"]);
    }

    #[test]
    fn test_connect_unknown_node() {
        let mut net = alarm_structure();
        assert!(matches!(
            net.connect("B", "Z"),
            Err(GraphError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_get_probability_uses_parent_order() {
        let mut net = alarm_structure();
        net.set_binary_cpt_row("A", &["True", "False"], 0.94).unwrap();
        net.set_binary_cpt_row("A", &["False", "True"], 0.29).unwrap();

        let assignment = Assignment::from([
            ("B".to_string(), "False".to_string()),
            ("E".to_string(), "True".to_string()),
        ]);
        let p = net.get_probability("A", "True", &assignment).unwrap();
        assert!((p - 0.29).abs() < 1e-12);
    }

    #[test]
    fn test_missing_cpt_entry_is_distinct_from_zero() {
        let mut net = alarm_structure();
        net.set_binary_cpt_row::<&str>("B", &[], 0.0).unwrap();

        let empty = Assignment::new();
        assert_eq!(net.get_probability("B", "True", &empty), Ok(0.0));
        assert_eq!(
            net.get_probability("E", "True", &empty),
            Err(GraphError::MissingCptEntry {
                node: "E".into(),
                key: "root".into()
            })
        );
    }

    #[test]
    fn test_set_cpt_row_rejects_unknown_state() {
        let mut net = alarm_structure();
        let row = ProbTable::from([("Maybe".to_string(), 1.0)]);
        assert!(matches!(
            net.set_cpt_row::<&str>("B", &[], row),
            Err(GraphError::UnknownState { .. })
        ));
    }

    #[test]
    fn test_topological_order() {
        let mut net = Network::new(ModelKind::Bayesian);
        // Children inserted before their parents.
        net.add_node("J", "John calls").unwrap();
        net.add_node("A", "Alarm").unwrap();
        net.add_node("B", "Burglary").unwrap();
        net.connect("A", "J").unwrap();
        net.connect("B", "A").unwrap();

        let order = net.topological_order().unwrap();
        let pos = |id: &str| order.iter().position(|x| *x == id).unwrap();
        assert!(pos("B") < pos("A"));
        assert!(pos("A") < pos("J"));
    }

    #[test]
    fn test_cycle_detected() {
        let mut net = alarm_structure();
        net.connect("A", "B").unwrap();
        assert!(matches!(
            net.topological_order(),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_would_create_cycle() {
        let net = alarm_structure();
        assert!(net.would_create_cycle("A", "B").unwrap());
        assert!(net.would_create_cycle("A", "A").unwrap());
        assert!(!net.would_create_cycle("B", "E").unwrap());
    }

    #[test]
    fn test_remove_node_drops_edges_and_reindexes() {
        let mut chain = Network::new(ModelKind::MarkovChain);
        chain.add_node("S", "Sunny").unwrap();
        chain.add_node("R", "Rainy").unwrap();
        chain.add_node("C", "Cloudy").unwrap();
        chain.connect("S", "R").unwrap();
        chain.connect("C", "S").unwrap();
        chain.set_transition("S", "R", 0.3).unwrap();
        chain.set_transition("C", "S", 1.0).unwrap();

        chain.remove_node("S").unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.position("C"), Some(1));
        assert!(chain.get("C").unwrap().children().is_empty());
        assert!(chain.get("R").unwrap().parents().is_empty());
        assert_eq!(chain.get("C").unwrap().transition_to("S"), None);
    }

    #[test]
    fn test_disconnect() {
        let mut net = alarm_structure();
        assert!(net.disconnect("B", "A").unwrap());
        assert!(!net.disconnect("B", "A").unwrap());
        assert_eq!(net.get("A").unwrap().parents(), ["E"]);
        assert!(net.get("B").unwrap().children().is_empty());
    }

    #[test]
    fn test_set_transition_requires_destination() {
        let mut chain = Network::new(ModelKind::MarkovChain);
        chain.add_node("S", "Sunny").unwrap();
        assert!(chain.set_transition("S", "S", 0.8).is_ok());
        assert!(matches!(
            chain.set_transition("S", "X", 0.2),
            Err(GraphError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_setters_reject_invalid_probabilities() {
        let mut net = alarm_structure();
        for bad in [1.5, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                net.set_binary_cpt_row::<&str>("B", &[], bad),
                Err(GraphError::InvalidProbability { .. })
            ));
        }
        let row = ProbTable::from([("True".to_string(), 1.2), ("False".to_string(), -0.2)]);
        assert!(matches!(
            net.set_cpt_row::<&str>("E", &[], row.clone()),
            Err(GraphError::InvalidProbability { .. })
        ));
        assert!(matches!(
            net.set_cpt("E", Cpt::from([(ROOT_KEY.to_string(), row)])),
            Err(GraphError::InvalidProbability { .. })
        ));
        assert!(net.get("B").unwrap().cpt().is_empty());
        assert!(net.get("E").unwrap().cpt().is_empty());

        let mut hmm = Network::new(ModelKind::Hmm);
        hmm.add_node("S", "Sick").unwrap();
        assert_eq!(
            hmm.set_transition("S", "S", -0.3),
            Err(GraphError::InvalidProbability {
                node: "S".into(),
                value: -0.3
            })
        );
        assert!(hmm.set_transition("S", "S", f64::NAN).is_err());
        assert!(hmm.set_emission("S", "Fever", 2.0).is_err());
        assert!(hmm
            .set_emissions("S", ProbTable::from([("Fever".to_string(), f64::NAN)]))
            .is_err());
        assert_eq!(hmm.get("S").unwrap().transition_to("S"), None);
        assert_eq!(hmm.get("S").unwrap().emission("Fever"), None);
    }

    #[test]
    fn test_set_transitions_replaces_row() {
        let mut chain = Network::new(ModelKind::MarkovChain);
        chain.add_node("S", "Sunny").unwrap();
        chain.add_node("R", "Rainy").unwrap();
        chain.set_transition("S", "S", 0.8).unwrap();
        chain.set_transition("S", "R", 0.2).unwrap();

        chain
            .set_transitions("S", ProbTable::from([("R".to_string(), 1.0)]))
            .unwrap();
        let s = chain.get("S").unwrap();
        assert_eq!(s.transition_to("S"), None);
        assert_eq!(s.transition_to("R"), Some(1.0));

        assert!(matches!(
            chain.set_transitions("S", ProbTable::from([("X".to_string(), 1.0)])),
            Err(GraphError::UnknownNode { .. })
        ));
        assert!(matches!(
            chain.set_transitions("S", ProbTable::from([("R".to_string(), 1.1)])),
            Err(GraphError::InvalidProbability { .. })
        ));
        assert_eq!(chain.get("S").unwrap().transition_to("R"), Some(1.0));
    }

    #[test]
    fn test_unassigned_parent_is_missing_entry() {
        let mut net = Network::new(ModelKind::Bayesian);
        net.add_node_with_states("P", "Parent", ["?", "x"]).unwrap();
        net.add_node("C", "Child").unwrap();
        net.connect("P", "C").unwrap();
        net.set_binary_cpt_row("C", &["?"], 0.7).unwrap();

        assert!(matches!(
            net.get_probability("C", "True", &Assignment::new()),
            Err(GraphError::MissingCptEntry { .. })
        ));
        let assignment = Assignment::from([("P".to_string(), "?".to_string())]);
        assert_eq!(net.get_probability("C", "True", &assignment), Ok(0.7));
    }
}
