//! Exact inference by variable elimination.
//!
//! One factor per node (its CPT restricted to the evidence) is built; each
//! hidden variable is then eliminated by multiplying the factors that
//! mention it and summing it out. The product of what remains is the
//! unnormalized posterior over the query.
//!
//! Hidden variables are eliminated in network insertion order. The result
//! does not depend on that order, only the size of the intermediate factors
//! does; no fill-in heuristic is applied.

use probgraph_core::{Assignment, Network};
use tracing::debug;

use crate::bayesnet::{check_query, Inference};
use crate::config::InferenceConfig;
use crate::dist::Distribution;
use crate::error::ProbError;
use crate::factor::Factor;

/// Variable-elimination engine over a borrowed network.
#[derive(Debug, Clone)]
pub struct VariableElimination<'a> {
    net: &'a Network,
    config: InferenceConfig,
}

impl<'a> VariableElimination<'a> {
    /// Engine with the default configuration.
    pub fn new(net: &'a Network) -> Self {
        Self::with_config(net, InferenceConfig::default())
    }

    pub fn with_config(net: &'a Network, config: InferenceConfig) -> Self {
        Self { net, config }
    }

    /// Non-query, non-evidence node ids in insertion order.
    pub fn hidden_variables(&self, query: &str, evidence: &Assignment) -> Vec<&'a str> {
        self.net
            .ids()
            .filter(|id| *id != query && !evidence.contains_key(*id))
            .collect()
    }

    /// Like [`query`](Inference::query) but eliminating hidden variables in
    /// the given order.
    ///
    /// Ids in `order` that are the query or evidence are ignored; hidden
    /// variables missing from `order` are eliminated afterwards in insertion
    /// order.
    ///
    /// # Errors
    ///
    /// [`ProbError::UnknownVariable`] if `order` names an unknown node, plus
    /// everything [`query`](Inference::query) can return.
    pub fn query_with_order(
        &self,
        query: &str,
        evidence: &Assignment,
        order: &[&str],
    ) -> Result<Distribution, ProbError> {
        let node = check_query(self.net, query, evidence)?;
        // Factors are only defined over a DAG.
        self.net.topological_order()?;

        let hidden = self.hidden_variables(query, evidence);
        let mut schedule: Vec<&str> = Vec::with_capacity(hidden.len());
        for &id in order {
            if !self.net.contains(id) {
                return Err(ProbError::UnknownVariable { id: id.to_string() });
            }
            if hidden.iter().any(|h| *h == id) && !schedule.contains(&id) {
                schedule.push(id);
            }
        }
        for &id in &hidden {
            if !schedule.contains(&id) {
                schedule.push(id);
            }
        }

        debug!(query, evidence = evidence.len(), order = ?schedule, "variable elimination");

        let mut factors = Vec::with_capacity(self.net.len());
        for id in self.net.ids() {
            factors.push(Factor::from_cpt(
                self.net,
                id,
                evidence,
                self.config.missing_cpt,
            )?);
        }

        for var in schedule {
            let (touching, rest): (Vec<Factor>, Vec<Factor>) =
                factors.into_iter().partition(|f| f.contains(var));
            factors = rest;
            if let Some(product) = touching.into_iter().reduce(|acc, f| acc.multiply(&f)) {
                factors.push(product.sum_out(var));
            }
        }

        let joint = factors
            .into_iter()
            .fold(Factor::constant(1.0), |acc, f| acc.multiply(&f));

        let states = node.states();
        let mut weights = vec![0.0; states.len()];
        match evidence.get(query) {
            // Every factor was restricted to the observation, so the joint is
            // a scalar: the weight of the observed state.
            Some(observed) => {
                if let Some(i) = node.state_index(observed) {
                    weights[i] = joint.values().values().sum();
                }
            }
            None => {
                if let Some(column) = joint.variables().iter().position(|v| v == query) {
                    for (key, value) in joint.values() {
                        if let Some(i) = node.state_index(&key[column]) {
                            weights[i] += value;
                        }
                    }
                }
            }
        }

        Ok(Distribution::from_weights(states.iter().cloned(), weights))
    }
}

impl Inference for VariableElimination<'_> {
    fn query(&self, query: &str, evidence: &Assignment) -> Result<Distribution, ProbError> {
        self.query_with_order(query, evidence, &[])
    }
}
