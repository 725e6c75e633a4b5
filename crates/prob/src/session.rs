//! Editing sessions.
//!
//! A [`Session`] owns the active network, its model kind and the inference
//! settings, and is passed explicitly to every call. It applies the editor
//! policies the graph model itself leaves open (Bayesian networks stay
//! acyclic) and forwards each query to the matching engine.
//!
//! Engines borrow the network immutably for the whole call, so edits can
//! only happen between calls. Callers that query from several threads while
//! editing take a [`snapshot`](Session::snapshot) first.

use std::sync::Arc;

use probgraph_core::{Assignment, GraphError, ModelKind, Network};
use tracing::debug;

use crate::bayesnet::{validate_cpts, CptDiagnostic, Inference, InferenceMethod};
use crate::config::InferenceConfig;
use crate::dist::Distribution;
use crate::elimination::VariableElimination;
use crate::error::ProbError;
use crate::hmm::HiddenMarkovModel;
use crate::inference::Enumeration;
use crate::markov::{MarkovChain, Stationary, TransitionDiagnostic};

/// The active model plus the settings used to query it.
#[derive(Debug, Clone)]
pub struct Session {
    network: Network,
    config: InferenceConfig,
    method: InferenceMethod,
}

impl Session {
    /// Empty session of the given kind with default settings.
    pub fn new(kind: ModelKind) -> Self {
        Self {
            network: Network::new(kind),
            config: InferenceConfig::default(),
            method: InferenceMethod::default(),
        }
    }

    /// Empty session with explicit (validated) settings.
    pub fn with_config(kind: ModelKind, config: InferenceConfig) -> Result<Self, ProbError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(kind)
        })
    }

    /// Adopt an existing network; the session takes its kind.
    pub fn from_network(network: Network) -> Self {
        Self {
            network,
            config: InferenceConfig::default(),
            method: InferenceMethod::default(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.network.kind()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access for node and table edits.
    ///
    /// Edges added through this handle bypass the acyclicity policy of
    /// [`connect`](Self::connect).
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: InferenceConfig) -> Result<(), ProbError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn method(&self) -> InferenceMethod {
        self.method
    }

    /// Choose the engine used by [`query`](Self::query).
    pub fn set_method(&mut self, method: InferenceMethod) {
        self.method = method;
    }

    /// Start over with an empty network of another kind.
    pub fn switch_mode(&mut self, kind: ModelKind) {
        debug!(from = %self.network.kind(), to = %kind, "switching mode");
        self.network = Network::new(kind);
    }

    /// Add `parent → child`.
    ///
    /// # Errors
    ///
    /// For Bayesian networks, [`GraphError::SelfLoop`] and
    /// [`GraphError::CycleDetected`] when the edge would break acyclicity.
    /// Chains and HMMs accept any edge, self-loops included.
    pub fn connect(&mut self, parent: &str, child: &str) -> Result<(), ProbError> {
        if !self.kind().allows_self_loops() {
            if parent == child {
                return Err(GraphError::SelfLoop {
                    id: parent.to_string(),
                }
                .into());
            }
            if self.network.would_create_cycle(parent, child)? {
                return Err(GraphError::CycleDetected {
                    id: child.to_string(),
                }
                .into());
            }
        }
        self.network.connect(parent, child)?;
        Ok(())
    }

    /// Immutable copy of the current network for concurrent readers.
    pub fn snapshot(&self) -> Arc<Network> {
        Arc::new(self.network.clone())
    }

    /// `P(query | evidence)` with the selected [`InferenceMethod`].
    pub fn query(&self, query: &str, evidence: &Assignment) -> Result<Distribution, ProbError> {
        self.method
            .query(&self.network, &self.config, query, evidence)
    }

    pub fn enumerate(&self, query: &str, evidence: &Assignment) -> Result<Distribution, ProbError> {
        Enumeration::with_config(&self.network, self.config.clone()).query(query, evidence)
    }

    pub fn eliminate(&self, query: &str, evidence: &Assignment) -> Result<Distribution, ProbError> {
        VariableElimination::with_config(&self.network, self.config.clone()).query(query, evidence)
    }

    pub fn evidence_probability(&self, evidence: &Assignment) -> Result<f64, ProbError> {
        Enumeration::with_config(&self.network, self.config.clone()).evidence_probability(evidence)
    }

    pub fn validate_cpts(&self) -> Result<Vec<CptDiagnostic>, ProbError> {
        self.expect(ModelKind::Bayesian)?;
        validate_cpts(&self.network, self.config.transition_sum_tolerance)
    }

    pub fn validate_transitions(&self) -> Result<Vec<TransitionDiagnostic>, ProbError> {
        self.markov().validate_transitions()
    }

    pub fn compute_stationary(&self) -> Result<Stationary, ProbError> {
        self.markov().compute_stationary()
    }

    pub fn viterbi<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<String>, ProbError> {
        self.hmm().viterbi(observations)
    }

    pub fn forward<S: AsRef<str>>(&self, observations: &[S]) -> Result<f64, ProbError> {
        self.hmm().forward(observations)
    }

    pub fn forward_log<S: AsRef<str>>(&self, observations: &[S]) -> Result<f64, ProbError> {
        self.hmm().forward_log(observations)
    }

    pub fn forward_backward<S: AsRef<str>>(
        &self,
        observations: &[S],
    ) -> Result<Vec<Distribution>, ProbError> {
        self.hmm().forward_backward(observations)
    }

    fn expect(&self, kind: ModelKind) -> Result<(), ProbError> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(ProbError::ModelMismatch {
                expected: kind,
                actual: self.kind(),
            })
        }
    }

    fn markov(&self) -> MarkovChain<'_> {
        MarkovChain::with_config(&self.network, self.config.clone())
    }

    fn hmm(&self) -> HiddenMarkovModel<'_> {
        HiddenMarkovModel::with_config(&self.network, self.config.clone())
    }
}
