//! Markov chain analysis over a network's transition tables.
//!
//! Node ids (insertion order) index the rows and columns of the transition
//! matrix: `M[i][j] = P(next = j | current = i)`, with undeclared entries
//! read as 0. The stationary distribution `π = π · M` is found by power
//! iteration from the uniform vector.
//!
//! ## Example
//!
//! ```rust
//! use probgraph_core::{ModelKind, Network};
//! use probgraph_prob::MarkovChain;
//!
//! let mut net = Network::new(ModelKind::MarkovChain);
//! net.add_node("S", "Sunny").unwrap();
//! net.add_node("L", "Rainy").unwrap();
//! net.set_transition("S", "S", 0.8).unwrap();
//! net.set_transition("S", "L", 0.2).unwrap();
//! net.set_transition("L", "S", 0.6).unwrap();
//! net.set_transition("L", "L", 0.4).unwrap();
//!
//! let pi = MarkovChain::new(&net).compute_stationary().unwrap().into_converged().unwrap();
//! assert!((pi.get("S").unwrap() - 0.75).abs() < 1e-3);
//! ```

use std::fmt;

use probgraph_core::{ModelKind, Network};
use tracing::{debug, warn};

use crate::config::InferenceConfig;
use crate::dist::Distribution;
use crate::error::ProbError;
use crate::math;

/// A node whose outgoing transitions do not sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDiagnostic {
    pub node: String,
    pub name: String,
    pub sum: f64,
}

impl fmt::Display for TransitionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) sums {:.2}", self.name, self.node, self.sum)
    }
}

/// How power iteration ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Convergence {
    /// Successive iterates were within the tolerance.
    Converged,
    /// The iteration cap was hit; `residual` is the last max-abs change.
    NonConvergent { residual: f64 },
}

/// Result of [`MarkovChain::compute_stationary`].
#[derive(Debug, Clone, PartialEq)]
pub struct Stationary {
    /// Last iterate, keyed by node id.
    pub distribution: Distribution,
    /// Number of matrix products performed.
    pub iterations: usize,
    pub convergence: Convergence,
}

impl Stationary {
    pub fn is_converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }

    /// The distribution, or [`ProbError::NonConvergent`] if the cap was hit.
    pub fn into_converged(self) -> Result<Distribution, ProbError> {
        match self.convergence {
            Convergence::Converged => Ok(self.distribution),
            Convergence::NonConvergent { residual } => Err(ProbError::NonConvergent {
                iterations: self.iterations,
                residual,
            }),
        }
    }
}

/// Analyzer over a borrowed Markov chain (or the hidden layer of an HMM).
#[derive(Debug, Clone)]
pub struct MarkovChain<'a> {
    net: &'a Network,
    config: InferenceConfig,
}

impl<'a> MarkovChain<'a> {
    pub fn new(net: &'a Network) -> Self {
        Self::with_config(net, InferenceConfig::default())
    }

    pub fn with_config(net: &'a Network, config: InferenceConfig) -> Self {
        Self { net, config }
    }

    fn check_kind(&self) -> Result<(), ProbError> {
        if self.net.kind().has_transitions() {
            Ok(())
        } else {
            Err(ProbError::ModelMismatch {
                expected: ModelKind::MarkovChain,
                actual: self.net.kind(),
            })
        }
    }

    /// Nodes whose outgoing transitions deviate from 1 by more than
    /// `transition_sum_tolerance`. Advisory; computation never depends on it.
    pub fn validate_transitions(&self) -> Result<Vec<TransitionDiagnostic>, ProbError> {
        self.check_kind()?;
        let tolerance = self.config.transition_sum_tolerance;
        Ok(self
            .net
            .nodes()
            .filter(|node| node.transitions().is_some())
            .map(|node| (node, node.transition_sum()))
            .filter(|(_, sum)| (sum - 1.0).abs() > tolerance)
            .map(|(node, sum)| TransitionDiagnostic {
                node: node.id().to_string(),
                name: node.name.clone(),
                sum,
            })
            .collect())
    }

    /// Dense `N × N` transition matrix in node insertion order.
    pub fn transition_matrix(&self) -> Result<Vec<Vec<f64>>, ProbError> {
        self.check_kind()?;
        let ids: Vec<&str> = self.net.ids().collect();
        Ok(self
            .net
            .nodes()
            .map(|from| {
                ids.iter()
                    .map(|to| from.transition_to(to).unwrap_or(0.0))
                    .collect()
            })
            .collect())
    }

    /// Power iteration `v ← v · M` from the uniform vector until the
    /// component-wise change is at most `stationary_tolerance`, or
    /// `max_iterations` products have been taken.
    ///
    /// The last iterate is returned either way; `convergence` says which.
    /// It is not renormalized, so rows that do not sum to 1 show up as mass
    /// drift.
    pub fn compute_stationary(&self) -> Result<Stationary, ProbError> {
        self.check_kind()?;
        if self.net.is_empty() {
            return Err(ProbError::EmptyNetwork);
        }

        let matrix = self.transition_matrix()?;
        let n = matrix.len();
        let mut vector = vec![1.0 / n as f64; n];
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            let next = math::vec_mat_mul(&vector, &matrix);
            residual = math::max_abs_diff(&vector, &next);
            vector = next;
            iterations += 1;
            if residual <= self.config.stationary_tolerance {
                break;
            }
        }

        let convergence = if residual <= self.config.stationary_tolerance {
            debug!(iterations, residual, "stationary distribution converged");
            Convergence::Converged
        } else {
            warn!(iterations, residual, "stationary iteration hit its cap");
            Convergence::NonConvergent { residual }
        };

        Ok(Stationary {
            distribution: Distribution::from_parts(self.net.ids().map(str::to_string), vector),
            iterations,
            convergence,
        })
    }
}
