//! # Prob - Inference over Bayesian Networks, Markov Chains and HMMs
//!
//! Exact and dynamic-programming algorithms over the labeled graphs of
//! [`probgraph_core`].
//!
//! ## Engines
//!
//! - **Enumeration**: recursive sum over the joint in topological order
//! - **Variable elimination**: multiply and sum out factors, one hidden
//!   variable at a time
//! - **Markov chain analysis**: transition-row diagnostics and the
//!   stationary distribution by power iteration
//! - **HMM**: Viterbi decoding, Forward likelihood, Forward-Backward
//!   smoothing
//!
//! All engines borrow the network immutably for the duration of a call and
//! keep no state between calls, so identical inputs give identical results.
//! Settings live in [`InferenceConfig`]; the [`Session`] type bundles a
//! network, its kind and the settings for editor-driven use.
//!
//! ## Example: Burglary Alarm
//!
//! ```rust
//! use probgraph_core::{Assignment, ModelKind, Network};
//! use probgraph_prob::{Enumeration, Inference, VariableElimination};
//!
//! let mut net = Network::new(ModelKind::Bayesian);
//! net.add_node("B", "Burglary").unwrap();
//! net.add_node("E", "Earthquake").unwrap();
//! net.add_node("A", "Alarm").unwrap();
//! net.connect("B", "A").unwrap();
//! net.connect("E", "A").unwrap();
//!
//! net.set_binary_cpt_row::<&str>("B", &[], 0.001).unwrap();
//! net.set_binary_cpt_row::<&str>("E", &[], 0.002).unwrap();
//! net.set_binary_cpt_row("A", &["True", "True"], 0.95).unwrap();
//! net.set_binary_cpt_row("A", &["True", "False"], 0.94).unwrap();
//! net.set_binary_cpt_row("A", &["False", "True"], 0.29).unwrap();
//! net.set_binary_cpt_row("A", &["False", "False"], 0.001).unwrap();
//!
//! let exact = Enumeration::new(&net).query("A", &Assignment::new()).unwrap();
//! assert!((exact.get("True").unwrap() - 0.0025164).abs() < 1e-6);
//!
//! let ve = VariableElimination::new(&net).query("A", &Assignment::new()).unwrap();
//! assert!(exact.tv_distance(&ve).unwrap() < 1e-9);
//! ```

mod bayesnet;
mod config;
mod dist;
mod elimination;
mod error;
mod factor;
mod hmm;
mod inference;
mod markov;
pub mod math;
mod session;

pub use bayesnet::{validate_cpts, CptDiagnostic, Inference, InferenceMethod};
pub use config::{InferenceConfig, MissingCptPolicy};
pub use dist::Distribution;
pub use elimination::VariableElimination;
pub use error::ProbError;
pub use factor::{Factor, FactorKey};
pub use hmm::HiddenMarkovModel;
pub use inference::Enumeration;
pub use markov::{Convergence, MarkovChain, Stationary, TransitionDiagnostic};
pub use session::Session;

/// Tolerance for "sums to one" checks.
pub const PROB_TOLERANCE: f64 = 1e-9;
