//! Clinic: decoding hidden health states from observed symptoms
//!
//! Run with: cargo run -p probgraph-prob --example medical_hmm
//!
//! This example demonstrates:
//! - An HMM with a uniform initial distribution
//! - Viterbi decoding of the most likely hidden path
//! - Sequence likelihood (plain and log-space Forward)
//! - Smoothed per-step posteriors (Forward-Backward)

use probgraph_core::{ModelKind, ProbTable};
use probgraph_prob::Session;
use tracing_subscriber::EnvFilter;

fn table(entries: &[(&str, f64)]) -> ProbTable {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("probgraph_prob=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    println!("=== Clinic HMM ===\n");

    // -------------------------------------------------------------------------
    // 1. Model
    // -------------------------------------------------------------------------
    println!("1. Model");
    println!("--------");
    println!();

    let mut session = Session::new(ModelKind::Hmm);
    let net = session.network_mut();
    net.add_node("H", "Healthy").unwrap();
    net.add_node("S", "Sick").unwrap();
    net.set_transition("H", "H", 0.7).unwrap();
    net.set_transition("H", "S", 0.3).unwrap();
    net.set_transition("S", "S", 0.6).unwrap();
    net.set_transition("S", "H", 0.4).unwrap();
    net.set_emissions(
        "H",
        table(&[("Normal", 0.8), ("Dizzy", 0.15), ("Fever", 0.05)]),
    )
    .unwrap();
    net.set_emissions(
        "S",
        table(&[("Normal", 0.1), ("Dizzy", 0.5), ("Fever", 0.4)]),
    )
    .unwrap();

    println!("Hidden states: Healthy (H), Sick (S); start uniform");
    println!("Emissions:     H {{Normal .8, Dizzy .15, Fever .05}}");
    println!("               S {{Normal .1, Dizzy .5,  Fever .4}}");
    println!();

    let symptoms = ["Dizzy", "Fever", "Normal"];
    println!("Observed: {symptoms:?}");
    println!();

    // -------------------------------------------------------------------------
    // 2. Viterbi
    // -------------------------------------------------------------------------
    println!("2. Most likely hidden path (Viterbi)");
    println!("------------------------------------");
    println!();
    let path = session.viterbi(&symptoms).unwrap();
    println!("{}", path.join(" → "));
    println!();

    // -------------------------------------------------------------------------
    // 3. Forward
    // -------------------------------------------------------------------------
    println!("3. Sequence likelihood (Forward)");
    println!("--------------------------------");
    println!();
    let p = session.forward(&symptoms).unwrap();
    let log_p = session.forward_log(&symptoms).unwrap();
    println!("P(O)    = {p:.8}");
    println!("ln P(O) = {log_p:.6}  (exp = {:.8})", log_p.exp());

    let long: Vec<&str> = symptoms.iter().copied().cycle().take(3000).collect();
    println!(
        "3000 steps: forward = {:e}, forward_log = {:.2}",
        session.forward(&long).unwrap(),
        session.forward_log(&long).unwrap()
    );
    println!();

    // -------------------------------------------------------------------------
    // 4. Forward-Backward
    // -------------------------------------------------------------------------
    println!("4. Smoothed posteriors (Forward-Backward)");
    println!("-----------------------------------------");
    println!();
    for (obs, gamma) in symptoms
        .iter()
        .zip(session.forward_backward(&symptoms).unwrap())
    {
        println!("{obs:>7}: {gamma}");
    }
}
