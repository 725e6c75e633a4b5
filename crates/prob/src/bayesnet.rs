//! Queryable Bayesian networks.
//!
//! The two exact engines ([`Enumeration`](crate::Enumeration) and
//! [`VariableElimination`](crate::VariableElimination)) share one interface,
//! [`Inference`], and the helpers in this module: query validation and CPT
//! lookup under a [`MissingCptPolicy`].

use std::fmt;

use probgraph_core::{row_key, Assignment, GraphError, ModelKind, Network, Node};
use tracing::warn;

use crate::config::{InferenceConfig, MissingCptPolicy};
use crate::dist::Distribution;
use crate::elimination::VariableElimination;
use crate::error::ProbError;
use crate::inference::Enumeration;
use crate::math::cartesian_product;
use crate::PROB_TOLERANCE;

/// Exact posterior queries `P(query | evidence)`.
///
/// Both engines must agree within floating-point tolerance for every
/// query/evidence pair on the same network.
pub trait Inference {
    /// Distribution over the states of `query`, in declaration order.
    fn query(&self, query: &str, evidence: &Assignment) -> Result<Distribution, ProbError>;
}

/// Run-time choice of engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceMethod {
    /// Recursive enumeration of the joint distribution.
    #[default]
    Enumeration,
    /// Sum-product variable elimination.
    VariableElimination,
}

impl InferenceMethod {
    /// Answer `P(query | evidence)` with the selected engine.
    pub fn query(
        self,
        net: &Network,
        config: &InferenceConfig,
        query: &str,
        evidence: &Assignment,
    ) -> Result<Distribution, ProbError> {
        match self {
            Self::Enumeration => Enumeration::with_config(net, config.clone()).query(query, evidence),
            Self::VariableElimination => {
                VariableElimination::with_config(net, config.clone()).query(query, evidence)
            }
        }
    }
}

/// Check that `net` is a Bayesian network and that `query` and every
/// evidence pair name existing nodes and declared states.
pub(crate) fn check_query<'n>(
    net: &'n Network,
    query: &str,
    evidence: &Assignment,
) -> Result<&'n Node, ProbError> {
    check_evidence(net, evidence)?;
    net.node(query).ok_or_else(|| ProbError::UnknownVariable {
        id: query.to_string(),
    })
}

/// Check that `net` is a Bayesian network and that every evidence pair
/// names an existing node and one of its declared states.
pub(crate) fn check_evidence(net: &Network, evidence: &Assignment) -> Result<(), ProbError> {
    if net.kind() != ModelKind::Bayesian {
        return Err(ProbError::ModelMismatch {
            expected: ModelKind::Bayesian,
            actual: net.kind(),
        });
    }
    for (id, state) in evidence {
        let observed = net.node(id).ok_or_else(|| ProbError::UnknownVariable { id: id.clone() })?;
        if !observed.has_state(state) {
            return Err(ProbError::UnknownState {
                node: id.clone(),
                state: state.clone(),
            });
        }
    }
    Ok(())
}

/// `P(node = state | row key)`, resolving an undefined entry per `policy`.
pub(crate) fn cpt_probability(
    node: &Node,
    key: &str,
    state: &str,
    policy: MissingCptPolicy,
) -> Result<f64, ProbError> {
    match node.cpt_entry(key, state) {
        Some(p) => Ok(p),
        None => undefined(node.id(), key, state, policy),
    }
}

/// `P(id = state | parents as in assignment)` under `policy`.
pub(crate) fn conditional_probability(
    net: &Network,
    id: &str,
    state: &str,
    assignment: &Assignment,
    policy: MissingCptPolicy,
) -> Result<f64, ProbError> {
    match net.get_probability(id, state, assignment) {
        Ok(p) => Ok(p),
        Err(GraphError::MissingCptEntry { node, key }) => undefined(&node, &key, state, policy),
        Err(e) => Err(e.into()),
    }
}

fn undefined(node: &str, key: &str, state: &str, policy: MissingCptPolicy) -> Result<f64, ProbError> {
    match policy {
        MissingCptPolicy::Strict => Err(ProbError::MissingCptEntry {
            node: node.to_string(),
            key: key.to_string(),
        }),
        MissingCptPolicy::Zero => {
            warn!(node, key, state, "undefined CPT entry treated as 0");
            Ok(0.0)
        }
    }
}

/// Problem found by [`validate_cpts`].
#[derive(Debug, Clone, PartialEq)]
pub enum CptDiagnostic {
    /// No row for a parent-state combination.
    MissingRow { node: String, key: String },
    /// A row whose entries do not sum to 1.
    RowSum { node: String, key: String, sum: f64 },
}

impl fmt::Display for CptDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRow { node, key } => write!(f, "{node} has no row for {key}"),
            Self::RowSum { node, key, sum } => write!(f, "{node} row {key} sums {sum:.2}"),
        }
    }
}

/// Advisory check of every CPT: each parent-state combination must have a
/// row and every row must sum to 1 (within `tolerance`).
///
/// Nodes are visited in insertion order, rows in odometer order of the
/// parents' states. Never blocks inference.
pub fn validate_cpts(net: &Network, tolerance: f64) -> Result<Vec<CptDiagnostic>, ProbError> {
    let mut diagnostics = Vec::new();
    for node in net.nodes() {
        let mut domains = Vec::with_capacity(node.parents().len());
        for parent in node.parents() {
            domains.push(net.get(parent)?.states().to_vec());
        }
        for combo in cartesian_product(&domains) {
            let key = row_key(&combo);
            match node.cpt().get(&key) {
                None => diagnostics.push(CptDiagnostic::MissingRow {
                    node: node.id().to_string(),
                    key,
                }),
                Some(row) => {
                    let sum: f64 = row.values().sum();
                    if (sum - 1.0).abs() > tolerance.max(PROB_TOLERANCE) {
                        diagnostics.push(CptDiagnostic::RowSum {
                            node: node.id().to_string(),
                            key,
                            sum,
                        });
                    }
                }
            }
        }
    }
    Ok(diagnostics)
}
