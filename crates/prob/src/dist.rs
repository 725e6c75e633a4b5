//! Labeled probability distributions returned by the engines.

use std::fmt;

use crate::math;
use crate::PROB_TOLERANCE;

/// A distribution over an ordered set of labels (states or node ids).
///
/// Labels keep the order of the node's states, or the network's insertion
/// order for distributions over nodes.
///
/// # Example
///
/// ```rust
/// use probgraph_prob::Distribution;
///
/// let d = Distribution::from_weights(["True", "False"], vec![1.0, 3.0]);
/// assert!((d.get("True").unwrap() - 0.25).abs() < 1e-12);
/// assert_eq!(d.mode(), Some("False"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    labels: Vec<String>,
    p: Vec<f64>,
}

impl Distribution {
    /// Normalize `weights` into a distribution over `labels`.
    ///
    /// All-zero weights are kept as they are; see
    /// [`is_degenerate`](Self::is_degenerate).
    pub fn from_weights<S: Into<String>>(
        labels: impl IntoIterator<Item = S>,
        mut weights: Vec<f64>,
    ) -> Self {
        math::normalize(&mut weights);
        Self::from_parts(labels, weights)
    }

    /// Build from already-computed probabilities without rescaling.
    pub fn from_parts<S: Into<String>>(labels: impl IntoIterator<Item = S>, p: Vec<f64>) -> Self {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        debug_assert_eq!(labels.len(), p.len());
        Self { labels, p }
    }

    /// Uniform distribution over `labels`.
    pub fn uniform<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let n = labels.len();
        Self {
            p: vec![1.0 / n as f64; n],
            labels,
        }
    }

    /// Point mass on `label`.
    pub fn point<S: Into<String>>(labels: impl IntoIterator<Item = S>, label: &str) -> Self {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let p = labels
            .iter()
            .map(|l| if l == label { 1.0 } else { 0.0 })
            .collect();
        Self { labels, p }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.p
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }

    /// Probability of `label`, if it belongs to the support set.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.p[i])
    }

    /// `(label, probability)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.p.iter().copied())
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.p.iter().sum()
    }

    /// True when every entry is zero, i.e. normalization had nothing to
    /// scale (impossible evidence or an all-zero model).
    pub fn is_degenerate(&self) -> bool {
        self.p.iter().all(|&x| x == 0.0)
    }

    /// Label with the highest probability; first one on ties.
    pub fn mode(&self) -> Option<&str> {
        math::argmax(&self.p).map(|i| self.labels[i].as_str())
    }

    /// Shannon entropy in nats. Zero-probability labels contribute 0.
    pub fn entropy(&self) -> f64 {
        self.p
            .iter()
            .filter(|&&x| x > 0.0)
            .map(|&x| -x * x.ln())
            .sum()
    }

    /// Total variation distance `0.5 · Σ |p - q|` over matching labels.
    ///
    /// `None` if the two label sets differ.
    pub fn tv_distance(&self, other: &Distribution) -> Option<f64> {
        if other.len() != self.len() {
            return None;
        }
        let mut sum = 0.0;
        for (label, p) in self.iter() {
            sum += (p - other.get(label)?).abs();
        }
        Some(sum / 2.0)
    }

    /// Whether the probabilities sum to 1 within [`PROB_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= PROB_TOLERANCE
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (label, p)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}: {p:.6}")?;
        }
        write!(f, "}}")
    }
}
