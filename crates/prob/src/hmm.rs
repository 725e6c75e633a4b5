//! Hidden Markov model inference.
//!
//! Hidden states are the network's nodes (insertion order); each carries a
//! transition table over other nodes and an emission table over arbitrary
//! observation labels. The initial distribution is uniform, `1/N`.
//!
//! Entries that are not declared at all read as `missing_probability_floor`
//! in every algorithm here. A declared `0.0` stays exactly zero, so
//! impossible transitions and emissions remain impossible (`ln 0 = -inf`
//! in Viterbi).
//!
//! ## Algorithms
//!
//! - [`viterbi`](HiddenMarkovModel::viterbi): most likely hidden path
//! - [`forward`](HiddenMarkovModel::forward): `P(O)` in plain probability
//!   space; underflows for long sequences
//! - [`forward_log`](HiddenMarkovModel::forward_log): `ln P(O)` with
//!   per-step rescaling
//! - [`forward_backward`](HiddenMarkovModel::forward_backward): smoothed
//!   per-step state distributions

use probgraph_core::{ModelKind, Network, Node};
use tracing::{debug, warn};

use crate::config::InferenceConfig;
use crate::dist::Distribution;
use crate::error::ProbError;
use crate::math;

/// Inference engine over a borrowed HMM.
#[derive(Debug, Clone)]
pub struct HiddenMarkovModel<'a> {
    net: &'a Network,
    config: InferenceConfig,
}

impl<'a> HiddenMarkovModel<'a> {
    pub fn new(net: &'a Network) -> Self {
        Self::with_config(net, InferenceConfig::default())
    }

    pub fn with_config(net: &'a Network, config: InferenceConfig) -> Self {
        Self { net, config }
    }

    /// Hidden states in insertion order, after checking the model kind.
    fn states(&self) -> Result<Vec<&'a Node>, ProbError> {
        if self.net.kind() != ModelKind::Hmm {
            return Err(ProbError::ModelMismatch {
                expected: ModelKind::Hmm,
                actual: self.net.kind(),
            });
        }
        Ok(self.net.nodes().collect())
    }

    fn transition(&self, from: &Node, to: &Node) -> f64 {
        from.transition_to(to.id())
            .unwrap_or(self.config.missing_probability_floor)
    }

    fn emission(&self, state: &Node, observation: &str) -> f64 {
        state
            .emission(observation)
            .unwrap_or(self.config.missing_probability_floor)
    }

    /// Most likely hidden-state path, one node id per observation.
    ///
    /// Log-space dynamic program. Back-pointers are `None` at `t = 0` and
    /// wherever every predecessor has score `-inf`; only then does
    /// backtracking fall back to the best state of the previous step.
    pub fn viterbi<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<String>, ProbError> {
        let states = self.states()?;
        if observations.is_empty() {
            return Ok(Vec::new());
        }
        if states.is_empty() {
            return Err(ProbError::EmptyNetwork);
        }
        debug!(observations = observations.len(), states = states.len(), "viterbi");

        let n = states.len();
        let log_init = (1.0 / n as f64).ln();
        let mut delta: Vec<Vec<f64>> = Vec::with_capacity(observations.len());
        let mut back: Vec<Vec<Option<usize>>> = Vec::with_capacity(observations.len());

        let first = observations[0].as_ref();
        delta.push(
            states
                .iter()
                .map(|s| log_init + self.emission(s, first).ln())
                .collect(),
        );
        back.push(vec![None; n]);

        for obs in &observations[1..] {
            let prev = &delta[delta.len() - 1];
            let mut scores = Vec::with_capacity(n);
            let mut pointers = Vec::with_capacity(n);
            for to in &states {
                let candidates: Vec<f64> = states
                    .iter()
                    .zip(prev)
                    .map(|(from, d)| d + self.transition(from, to).ln())
                    .collect();
                let best = math::argmax(&candidates);
                let score = match best {
                    Some(i) => candidates[i] + self.emission(to, obs.as_ref()).ln(),
                    None => f64::NEG_INFINITY,
                };
                scores.push(score);
                pointers.push(best);
            }
            delta.push(scores);
            back.push(pointers);
        }

        let last = delta.len() - 1;
        let mut current = math::argmax(&delta[last]).unwrap_or_else(|| {
            warn!("every final Viterbi score is -inf; picking the first state");
            0
        });
        let mut path = vec![current; observations.len()];
        for t in (1..observations.len()).rev() {
            current = match back[t][current] {
                Some(prev) => prev,
                None => {
                    warn!(t, "missing Viterbi back-pointer; using best previous state");
                    math::argmax(&delta[t - 1]).unwrap_or(0)
                }
            };
            path[t - 1] = current;
        }

        Ok(path.into_iter().map(|i| states[i].id().to_string()).collect())
    }

    /// `P(observations)`, the sum of the final forward column.
    ///
    /// Computed in plain probability space without rescaling, so long
    /// sequences underflow to 0; use [`forward_log`](Self::forward_log)
    /// there. An empty sequence yields 0.
    pub fn forward<S: AsRef<str>>(&self, observations: &[S]) -> Result<f64, ProbError> {
        let states = self.states()?;
        if observations.is_empty() {
            return Ok(0.0);
        }
        if states.is_empty() {
            return Err(ProbError::EmptyNetwork);
        }
        debug!(observations = observations.len(), "forward");

        let (alpha, _) = self.alpha_pass(&states, observations, false);
        Ok(alpha.last().map(|col| col.iter().sum::<f64>()).unwrap_or(0.0))
    }

    /// `ln P(observations)`, with the forward column rescaled to sum 1 at
    /// every step. `-inf` for an empty or impossible sequence.
    pub fn forward_log<S: AsRef<str>>(&self, observations: &[S]) -> Result<f64, ProbError> {
        let states = self.states()?;
        if observations.is_empty() {
            return Ok(f64::NEG_INFINITY);
        }
        if states.is_empty() {
            return Err(ProbError::EmptyNetwork);
        }

        let (_, scales) = self.alpha_pass(&states, observations, true);
        Ok(scales.iter().map(|c| c.ln()).sum())
    }

    /// Smoothed state distribution `P(state_t | observations)` for every
    /// step, each over node ids in insertion order.
    ///
    /// Forward and backward columns are rescaled per step; the posterior is
    /// unaffected by the scaling. A step whose normalizer is exactly zero
    /// (an impossible sequence) is divided by `normalizer_floor` instead and
    /// comes out all-zero.
    pub fn forward_backward<S: AsRef<str>>(
        &self,
        observations: &[S],
    ) -> Result<Vec<Distribution>, ProbError> {
        let states = self.states()?;
        if observations.is_empty() {
            return Ok(Vec::new());
        }
        if states.is_empty() {
            return Err(ProbError::EmptyNetwork);
        }
        debug!(observations = observations.len(), "forward-backward");

        let (alpha, _) = self.alpha_pass(&states, observations, true);
        let beta = self.beta_pass(&states, observations);
        let ids: Vec<String> = states.iter().map(|s| s.id().to_string()).collect();

        Ok(alpha
            .iter()
            .zip(&beta)
            .enumerate()
            .map(|(t, (a, b))| {
                let mut gamma: Vec<f64> = a.iter().zip(b).map(|(x, y)| x * y).collect();
                let sum: f64 = gamma.iter().sum();
                let norm = if sum > 0.0 {
                    sum
                } else {
                    warn!(t, "zero forward-backward normalizer");
                    self.config.normalizer_floor
                };
                for g in &mut gamma {
                    *g /= norm;
                }
                Distribution::from_parts(ids.iter().cloned(), gamma)
            })
            .collect())
    }

    /// Forward columns `alpha[t][s]`, optionally rescaled to sum 1; the
    /// second value holds the per-step sums before rescaling.
    fn alpha_pass<S: AsRef<str>>(
        &self,
        states: &[&Node],
        observations: &[S],
        rescale: bool,
    ) -> (Vec<Vec<f64>>, Vec<f64>) {
        let n = states.len() as f64;
        let mut alpha: Vec<Vec<f64>> = Vec::with_capacity(observations.len());
        let mut scales = Vec::with_capacity(observations.len());

        for (t, obs) in observations.iter().enumerate() {
            let mut column: Vec<f64> = if t == 0 {
                states
                    .iter()
                    .map(|s| self.emission(s, obs.as_ref()) / n)
                    .collect()
            } else {
                let prev = &alpha[t - 1];
                states
                    .iter()
                    .map(|to| {
                        let inflow: f64 = states
                            .iter()
                            .zip(prev)
                            .map(|(from, a)| a * self.transition(from, to))
                            .sum();
                        self.emission(to, obs.as_ref()) * inflow
                    })
                    .collect()
            };
            let scale = if rescale {
                math::normalize(&mut column)
            } else {
                column.iter().sum()
            };
            scales.push(scale);
            alpha.push(column);
        }
        (alpha, scales)
    }

    /// Backward columns `beta[t][s]`, rescaled to sum 1 at every step.
    fn beta_pass<S: AsRef<str>>(&self, states: &[&Node], observations: &[S]) -> Vec<Vec<f64>> {
        let steps = observations.len();
        let mut beta = vec![vec![1.0; states.len()]; steps];
        for t in (0..steps.saturating_sub(1)).rev() {
            let next_obs = observations[t + 1].as_ref();
            let mut column: Vec<f64> = states
                .iter()
                .map(|from| {
                    states
                        .iter()
                        .zip(&beta[t + 1])
                        .map(|(to, b)| self.transition(from, to) * self.emission(to, next_obs) * b)
                        .sum()
                })
                .collect();
            math::normalize(&mut column);
            beta[t] = column;
        }
        beta
    }
}
