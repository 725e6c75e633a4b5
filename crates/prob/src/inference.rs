//! Exact inference by enumeration.
//!
//! For each state `s` of the query variable the joint probability of
//! `evidence ∪ {query = s}` is computed by one recursive pass over every
//! node, summing out the unassigned ones. The results are then normalized.
//!
//! Nodes are visited in an explicit topological order, so every parent is
//! assigned before its children's CPTs are read. Cost is exponential in the
//! number of non-evidence variables; suitable for small networks.
//!
//! ## Example
//!
//! ```rust
//! use probgraph_core::{Assignment, ModelKind, Network};
//! use probgraph_prob::{Enumeration, Inference};
//!
//! let mut net = Network::new(ModelKind::Bayesian);
//! net.add_node("C", "Coin").unwrap();
//! net.set_binary_cpt_row::<&str>("C", &[], 0.3).unwrap();
//!
//! let d = Enumeration::new(&net).query("C", &Assignment::new()).unwrap();
//! assert!((d.get("True").unwrap() - 0.3).abs() < 1e-12);
//! ```

use probgraph_core::{Assignment, Network};
use tracing::debug;

use crate::bayesnet::{check_evidence, check_query, conditional_probability, Inference};
use crate::config::InferenceConfig;
use crate::dist::Distribution;
use crate::error::ProbError;

/// Enumeration engine over a borrowed network.
#[derive(Debug, Clone)]
pub struct Enumeration<'a> {
    net: &'a Network,
    config: InferenceConfig,
}

impl<'a> Enumeration<'a> {
    /// Engine with the default configuration.
    pub fn new(net: &'a Network) -> Self {
        Self::with_config(net, InferenceConfig::default())
    }

    pub fn with_config(net: &'a Network, config: InferenceConfig) -> Self {
        Self { net, config }
    }

    /// `P(evidence)`: the joint probability of the observed states with
    /// every other variable summed out.
    ///
    /// Empty evidence yields the total mass of the model (1 for a complete,
    /// normalized network).
    pub fn evidence_probability(&self, evidence: &Assignment) -> Result<f64, ProbError> {
        check_evidence(self.net, evidence)?;
        let order = self.net.topological_order()?;
        let mut assignment = evidence.clone();
        self.eval_all(&order, &mut assignment)
    }

    /// Joint probability of `assignment` extended over `remaining`.
    ///
    /// Assigned nodes contribute their CPT entry; unassigned ones are summed
    /// over their states. `assignment` is restored before returning `Ok`.
    fn eval_all(&self, remaining: &[&str], assignment: &mut Assignment) -> Result<f64, ProbError> {
        let Some((&id, rest)) = remaining.split_first() else {
            return Ok(1.0);
        };

        if let Some(state) = assignment.get(id).cloned() {
            let p = self.probability(id, &state, assignment)?;
            return Ok(p * self.eval_all(rest, assignment)?);
        }

        let mut total = 0.0;
        for state in self.net.get(id)?.states() {
            assignment.insert(id.to_string(), state.clone());
            let p = self.probability(id, state, assignment)?;
            total += p * self.eval_all(rest, assignment)?;
        }
        assignment.remove(id);
        Ok(total)
    }

    fn probability(&self, id: &str, state: &str, assignment: &Assignment) -> Result<f64, ProbError> {
        conditional_probability(self.net, id, state, assignment, self.config.missing_cpt)
    }
}

impl Inference for Enumeration<'_> {
    /// Evidence on the query variable itself yields a point mass on the
    /// observed state: every other state gets weight 0.
    fn query(&self, query: &str, evidence: &Assignment) -> Result<Distribution, ProbError> {
        let node = check_query(self.net, query, evidence)?;
        let order = self.net.topological_order()?;
        debug!(query, evidence = evidence.len(), nodes = order.len(), "enumeration query");

        let observed = evidence.get(query);
        let mut assignment = evidence.clone();
        let mut weights = Vec::with_capacity(node.states().len());
        for state in node.states() {
            if observed.is_some_and(|o| o != state) {
                weights.push(0.0);
                continue;
            }
            assignment.insert(query.to_string(), state.clone());
            weights.push(self.eval_all(&order, &mut assignment)?);
        }

        let dist = Distribution::from_weights(node.states().iter().cloned(), weights);
        if dist.is_degenerate() {
            debug!(query, "evidence has zero probability");
        }
        Ok(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probgraph_core::{GraphError, ModelKind};

    use crate::config::MissingCptPolicy;

    fn evidence(pairs: &[(&str, &str)]) -> Assignment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Cloudy → {Sprinkler, Rain} → WetGrass.
    fn sprinkler() -> Network {
        let mut net = Network::new(ModelKind::Bayesian);
        for (id, name) in [
            ("C", "Cloudy"),
            ("S", "Sprinkler"),
            ("R", "Rain"),
            ("W", "WetGrass"),
        ] {
            net.add_node(id, name).unwrap();
        }
        net.connect("C", "S").unwrap();
        net.connect("C", "R").unwrap();
        net.connect("S", "W").unwrap();
        net.connect("R", "W").unwrap();

        net.set_binary_cpt_row::<&str>("C", &[], 0.5).unwrap();
        net.set_binary_cpt_row("S", &["True"], 0.1).unwrap();
        net.set_binary_cpt_row("S", &["False"], 0.5).unwrap();
        net.set_binary_cpt_row("R", &["True"], 0.8).unwrap();
        net.set_binary_cpt_row("R", &["False"], 0.2).unwrap();
        net.set_binary_cpt_row("W", &["True", "True"], 0.99).unwrap();
        net.set_binary_cpt_row("W", &["True", "False"], 0.9).unwrap();
        net.set_binary_cpt_row("W", &["False", "True"], 0.9).unwrap();
        net.set_binary_cpt_row("W", &["False", "False"], 0.0).unwrap();
        net
    }

    #[test]
    fn test_prior_marginal() {
        let net = sprinkler();
        let d = Enumeration::new(&net).query("R", &Assignment::new()).unwrap();
        assert!((d.get("True").unwrap() - 0.5).abs() < 1e-12);
        assert!(d.is_normalized());
    }

    #[test]
    fn test_posterior_given_wet_grass() {
        let net = sprinkler();
        let engine = Enumeration::new(&net);
        let d = engine.query("R", &evidence(&[("W", "True")])).unwrap();

        let p_w = engine.evidence_probability(&evidence(&[("W", "True")])).unwrap();
        let p_rw = engine
            .evidence_probability(&evidence(&[("W", "True"), ("R", "True")]))
            .unwrap();
        assert!((d.get("True").unwrap() - p_rw / p_w).abs() < 1e-12);
        assert!((p_w - 0.6471).abs() < 1e-4);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        // Child declared before its parents.
        let mut net = Network::new(ModelKind::Bayesian);
        net.add_node("W", "Wet").unwrap();
        net.add_node("R", "Rain").unwrap();
        net.connect("R", "W").unwrap();
        net.set_binary_cpt_row::<&str>("R", &[], 0.2).unwrap();
        net.set_binary_cpt_row("W", &["True"], 0.9).unwrap();
        net.set_binary_cpt_row("W", &["False"], 0.1).unwrap();

        let d = Enumeration::new(&net).query("W", &Assignment::new()).unwrap();
        assert!((d.get("True").unwrap() - 0.26).abs() < 1e-12);
    }

    #[test]
    fn test_evidence_on_query_is_point_mass() {
        let net = sprinkler();
        let d = Enumeration::new(&net)
            .query("R", &evidence(&[("R", "False"), ("W", "True")]))
            .unwrap();
        assert_eq!(d.probabilities(), [0.0, 1.0]);
    }

    #[test]
    fn test_impossible_evidence_is_degenerate() {
        let net = sprinkler();
        let d = Enumeration::new(&net)
            .query(
                "C",
                &evidence(&[("S", "False"), ("R", "False"), ("W", "True")]),
            )
            .unwrap();
        assert!(d.is_degenerate());
    }

    #[test]
    fn test_missing_entry_strict_and_zero() {
        let mut net = sprinkler();
        net.add_node("X", "Unset").unwrap();

        let strict = Enumeration::new(&net).query("C", &Assignment::new());
        assert!(matches!(strict, Err(ProbError::MissingCptEntry { .. })));

        let config = InferenceConfig {
            missing_cpt: MissingCptPolicy::Zero,
            ..InferenceConfig::default()
        };
        let lenient = Enumeration::with_config(&net, config)
            .query("C", &Assignment::new())
            .unwrap();
        assert!(lenient.is_degenerate());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut net = sprinkler();
        net.connect("W", "C").unwrap();
        let err = Enumeration::new(&net)
            .query("C", &Assignment::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ProbError::Graph(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_evidence_probability_empty_is_total_mass() {
        let net = sprinkler();
        let p = Enumeration::new(&net)
            .evidence_probability(&Assignment::new())
            .unwrap();
        assert!((p - 1.0).abs() < 1e-12);
    }
}
