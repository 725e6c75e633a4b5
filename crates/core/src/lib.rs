//! # Core - Labeled Graph Substrate
//!
//! The data model shared by all three model families:
//!
//! - **Nodes**: variables, chain states or hidden states, each with ordered
//!   state labels and its probability tables
//! - **Networks**: an id-indexed node table with symmetric parent/child
//!   adjacency lists
//! - **Model kinds**: a tagged union selecting Bayesian network, Markov chain
//!   or HMM semantics
//! - **Errors**: typed failures for unknown ids, duplicate ids, cycles and
//!   undefined CPT entries
//!
//! ## Example
//!
//! ```rust
//! use probgraph_core::{ModelKind, Network};
//!
//! let mut net = Network::new(ModelKind::Bayesian);
//! net.add_node("B", "Burglary").unwrap();
//! net.add_node("A", "Alarm").unwrap();
//! net.connect("B", "A").unwrap();
//!
//! net.set_binary_cpt_row::<&str>("B", &[], 0.001).unwrap();
//! net.set_binary_cpt_row("A", &["True"], 0.94).unwrap();
//! net.set_binary_cpt_row("A", &["False"], 0.001).unwrap();
//!
//! assert_eq!(net.topological_order().unwrap(), vec!["B", "A"]);
//! ```

pub mod error;
pub mod model;
pub mod network;
pub mod node;

pub use error::GraphError;
pub use model::ModelKind;
pub use network::{Assignment, Network};
pub use node::{row_key, Cpt, Node, ProbTable, DEFAULT_STATES, KEY_SEPARATOR, ROOT_KEY};
