//! Burglary alarm: exact inference on a five-variable Bayesian network
//!
//! Run with: cargo run -p probgraph-prob --example alarm
//! Debug events: RUST_LOG=probgraph_prob=debug cargo run -p probgraph-prob --example alarm
//!
//! This example demonstrates:
//! - Building a network through a `Session` (acyclicity enforced on connect)
//! - Prior marginals and posteriors by enumeration
//! - Variable elimination giving the same answers
//! - CPT diagnostics and the strict missing-entry policy

use probgraph_core::{Assignment, ModelKind};
use probgraph_prob::{InferenceMethod, Session};
use tracing_subscriber::EnvFilter;

fn evidence(pairs: &[(&str, &str)]) -> Assignment {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("probgraph_prob=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    println!("=== Burglary Alarm ===\n");

    // -------------------------------------------------------------------------
    // 1. Structure
    // -------------------------------------------------------------------------
    println!("1. Structure");
    println!("------------");
    println!();
    println!("  Burglary (B)   Earthquake (E)");
    println!("          ↘       ↙");
    println!("          Alarm (A)");
    println!("          ↙       ↘");
    println!("  JohnCalls (J)   MaryCalls (M)");
    println!();

    let mut session = Session::new(ModelKind::Bayesian);
    for (id, name) in [
        ("B", "Burglary"),
        ("E", "Earthquake"),
        ("A", "Alarm"),
        ("J", "JohnCalls"),
        ("M", "MaryCalls"),
    ] {
        session.network_mut().add_node(id, name).unwrap();
    }
    for (parent, child) in [("B", "A"), ("E", "A"), ("A", "J"), ("A", "M")] {
        session.connect(parent, child).unwrap();
    }

    match session.connect("M", "B") {
        Ok(()) => println!("M → B accepted (unexpected)"),
        Err(e) => println!("M → B rejected: {e}"),
    }
    println!(
        "Topological order: {:?}",
        session.network().topological_order().unwrap()
    );
    println!();

    // -------------------------------------------------------------------------
    // 2. Conditional probability tables
    // -------------------------------------------------------------------------
    println!("2. Conditional probability tables");
    println!("---------------------------------");
    println!();

    let net = session.network_mut();
    net.set_binary_cpt_row::<&str>("B", &[], 0.001).unwrap();
    net.set_binary_cpt_row::<&str>("E", &[], 0.002).unwrap();
    net.set_binary_cpt_row("A", &["True", "True"], 0.95).unwrap();
    net.set_binary_cpt_row("A", &["True", "False"], 0.94).unwrap();
    net.set_binary_cpt_row("A", &["False", "True"], 0.29).unwrap();
    net.set_binary_cpt_row("A", &["False", "False"], 0.001).unwrap();
    net.set_binary_cpt_row("J", &["True"], 0.90).unwrap();

    println!("J | A=False not set yet:");
    for d in session.validate_cpts().unwrap() {
        println!("  {d}");
    }
    match session.enumerate("B", &Assignment::new()) {
        Ok(d) => println!("  P(B) = {d}"),
        Err(e) => println!("  query refused: {e}"),
    }

    let net = session.network_mut();
    net.set_binary_cpt_row("J", &["False"], 0.05).unwrap();
    net.set_binary_cpt_row("M", &["True"], 0.70).unwrap();
    net.set_binary_cpt_row("M", &["False"], 0.01).unwrap();
    println!(
        "After completing J and M: {} diagnostics",
        session.validate_cpts().unwrap().len()
    );
    println!();

    // -------------------------------------------------------------------------
    // 3. Queries
    // -------------------------------------------------------------------------
    println!("3. Queries (enumeration)");
    println!("------------------------");
    println!();

    let prior = session.enumerate("A", &Assignment::new()).unwrap();
    println!("P(A)          = {prior}");

    let both_call = evidence(&[("J", "True"), ("M", "True")]);
    let posterior = session.enumerate("B", &both_call).unwrap();
    println!("P(B | j, m)   = {posterior}");

    let p_calls = session.evidence_probability(&both_call).unwrap();
    println!("P(j, m)       = {p_calls:.6}");

    let explained = session
        .enumerate("B", &evidence(&[("J", "True"), ("M", "True"), ("E", "True")]))
        .unwrap();
    println!("P(B | j, m, e) = {explained}   (the earthquake explains the alarm away)");
    println!();

    // -------------------------------------------------------------------------
    // 4. Variable elimination
    // -------------------------------------------------------------------------
    println!("4. Variable elimination");
    println!("-----------------------");
    println!();

    session.set_method(InferenceMethod::VariableElimination);
    let ve = session.query("B", &both_call).unwrap();
    println!("P(B | j, m)   = {ve}");
    println!(
        "TV distance to enumeration: {:.2e}",
        ve.tv_distance(&posterior).unwrap()
    );
}
