//! Factors: the algebraic objects of variable elimination.
//!
//! A factor maps joint states of an ordered variable list to non-negative
//! values. Keys hold one state label per variable, in the order of
//! `variables`; a factor over no variables is a scalar stored under the
//! empty key.
//!
//! Factors live only for the duration of one elimination call.

use std::collections::BTreeMap;

use probgraph_core::{row_key, Assignment, Network};

use crate::bayesnet::cpt_probability;
use crate::config::MissingCptPolicy;
use crate::error::ProbError;
use crate::math::cartesian_product;

/// Joint-state key: one state label per factor variable.
pub type FactorKey = Vec<String>;

/// A non-negative function over the joint states of some variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    variables: Vec<String>,
    values: BTreeMap<FactorKey, f64>,
}

impl Factor {
    pub fn new(variables: Vec<String>, values: BTreeMap<FactorKey, f64>) -> Self {
        debug_assert!(values.keys().all(|k| k.len() == variables.len()));
        Self { variables, values }
    }

    /// A factor over no variables.
    pub fn constant(value: f64) -> Self {
        Self {
            variables: Vec::new(),
            values: BTreeMap::from([(Vec::new(), value)]),
        }
    }

    /// The CPT of `node_id` restricted to `evidence`.
    ///
    /// The variable list is the node's parents followed by the node itself,
    /// minus every evidence variable. Assignments inconsistent with the
    /// evidence are skipped; the rest are accumulated under their reduced
    /// key, since several full assignments can collapse onto one key once
    /// the evidence components are dropped.
    pub fn from_cpt(
        net: &Network,
        node_id: &str,
        evidence: &Assignment,
        policy: MissingCptPolicy,
    ) -> Result<Self, ProbError> {
        let node = net.get(node_id)?;
        let full_vars: Vec<&str> = node
            .parents()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(node.id()))
            .collect();

        let mut domains = Vec::with_capacity(full_vars.len());
        for var in &full_vars {
            let states = match evidence.get(*var) {
                Some(observed) => vec![observed.as_str()],
                None => net.get(var)?.states().iter().map(String::as_str).collect(),
            };
            domains.push(states);
        }

        let kept: Vec<usize> = (0..full_vars.len())
            .filter(|&i| !evidence.contains_key(full_vars[i]))
            .collect();
        let variables: Vec<String> = kept.iter().map(|&i| full_vars[i].to_string()).collect();

        let mut values = BTreeMap::new();
        for combo in cartesian_product(&domains) {
            let Some((state, parent_states)) = combo.split_last() else {
                continue;
            };
            let key = row_key(parent_states);
            let p = cpt_probability(node, &key, state, policy)?;
            let reduced: FactorKey = kept.iter().map(|&i| combo[i].to_string()).collect();
            *values.entry(reduced).or_insert(0.0) += p;
        }

        Ok(Self { variables, values })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn values(&self) -> &BTreeMap<FactorKey, f64> {
        &self.values
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.variables.iter().any(|v| v == variable)
    }

    pub fn is_constant(&self) -> bool {
        self.variables.is_empty()
    }

    /// Value stored for a joint state, if any.
    pub fn value<S: AsRef<str>>(&self, key: &[S]) -> Option<f64> {
        let key: FactorKey = key.iter().map(|s| s.as_ref().to_string()).collect();
        self.values.get(&key).copied()
    }

    /// Pointwise product.
    ///
    /// The result ranges over the union of both variable lists (this
    /// factor's variables first). Rows are joined when they agree on every
    /// shared variable.
    pub fn multiply(&self, other: &Factor) -> Factor {
        let mut variables = self.variables.clone();
        for v in &other.variables {
            if !variables.contains(v) {
                variables.push(v.clone());
            }
        }

        let shared: Vec<(usize, usize)> = self
            .variables
            .iter()
            .enumerate()
            .filter_map(|(i, v)| other.position(v).map(|j| (i, j)))
            .collect();
        let other_only: Vec<usize> = (0..other.variables.len())
            .filter(|&j| !self.contains(&other.variables[j]))
            .collect();

        let mut values = BTreeMap::new();
        for (k1, v1) in &self.values {
            for (k2, v2) in &other.values {
                if shared.iter().any(|&(i, j)| k1[i] != k2[j]) {
                    continue;
                }
                let mut key = k1.clone();
                key.extend(other_only.iter().map(|&j| k2[j].clone()));
                values.insert(key, v1 * v2);
            }
        }

        Factor { variables, values }
    }

    /// Marginalize `variable` out, summing rows that become identical.
    ///
    /// A factor that does not mention `variable` is returned unchanged.
    pub fn sum_out(&self, variable: &str) -> Factor {
        let Some(index) = self.position(variable) else {
            return self.clone();
        };

        let mut variables = self.variables.clone();
        variables.remove(index);

        let mut values = BTreeMap::new();
        for (key, v) in &self.values {
            let mut reduced = key.clone();
            reduced.remove(index);
            *values.entry(reduced).or_insert(0.0) += v;
        }

        Factor { variables, values }
    }

    fn position(&self, variable: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == variable)
    }
}
