//! Weather: stationary distribution of a two-state Markov chain
//!
//! Run with: cargo run -p probgraph-prob --example weather_chain
//!
//! This example demonstrates:
//! - Transition tables with self-loops
//! - Advisory row-sum diagnostics
//! - Power iteration and explicit non-convergence

use probgraph_core::ModelKind;
use probgraph_prob::{Convergence, InferenceConfig, Session};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("probgraph_prob=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    println!("=== Weather Chain ===\n");

    // -------------------------------------------------------------------------
    // 1. Transitions
    // -------------------------------------------------------------------------
    println!("1. Transitions");
    println!("--------------");
    println!();
    println!("  Sunny → Sunny 0.8   Sunny → Rainy 0.2");
    println!("  Rainy → Rainy 0.4   Rainy → Sunny 0.6");
    println!();

    let mut session = Session::new(ModelKind::MarkovChain);
    session.network_mut().add_node("S", "Sunny").unwrap();
    session.network_mut().add_node("L", "Rainy").unwrap();
    for (from, to, p) in [
        ("S", "S", 0.8),
        ("S", "L", 0.2),
        ("L", "L", 0.4),
        ("L", "S", 0.3),
    ] {
        session.connect(from, to).unwrap();
        session.network_mut().set_transition(from, to, p).unwrap();
    }

    println!("Row check with L → S = 0.3:");
    for d in session.validate_transitions().unwrap() {
        println!("  {d}");
    }
    session.network_mut().set_transition("L", "S", 0.6).unwrap();
    println!(
        "After fixing L → S = 0.6: {} diagnostics",
        session.validate_transitions().unwrap().len()
    );
    println!();

    // -------------------------------------------------------------------------
    // 2. Stationary distribution
    // -------------------------------------------------------------------------
    println!("2. Stationary distribution");
    println!("--------------------------");
    println!();

    let stationary = session.compute_stationary().unwrap();
    println!(
        "π = {} after {} iterations",
        stationary.distribution, stationary.iterations
    );
    println!("Expected: Sunny 0.75, Rainy 0.25");
    println!();

    // -------------------------------------------------------------------------
    // 3. Non-convergence is reported
    // -------------------------------------------------------------------------
    println!("3. Non-convergence is reported");
    println!("------------------------------");
    println!();

    let mut flip = Session::with_config(
        ModelKind::MarkovChain,
        InferenceConfig {
            max_iterations: 25,
            ..InferenceConfig::default()
        },
    )
    .unwrap();
    for id in ["A", "B", "C"] {
        flip.network_mut().add_node(id, id).unwrap();
    }
    for (from, to) in [("A", "B"), ("B", "A"), ("C", "A")] {
        flip.connect(from, to).unwrap();
        flip.network_mut().set_transition(from, to, 1.0).unwrap();
    }

    let result = flip.compute_stationary().unwrap();
    match result.convergence {
        Convergence::Converged => println!("converged to {}", result.distribution),
        Convergence::NonConvergent { residual } => println!(
            "periodic chain: stopped after {} iterations, residual {residual:.3}, last iterate {}",
            result.iterations, result.distribution
        ),
    }
    if let Err(e) = result.into_converged() {
        println!("into_converged: {e}");
    }
}
