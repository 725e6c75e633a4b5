//! Property-based tests over randomly generated small models.
//!
//! Bayesian networks are random DAGs with up to six variables of two or
//! three states, inserted in reverse topological order so the engines must
//! compute the order themselves. Every CPT entry is at least 0.05, so all
//! evidence has positive probability.

use proptest::prelude::*;
use proptest::sample::Index;

use probgraph_core::{Assignment, ModelKind, Network, ProbTable};
use probgraph_prob::{
    Distribution, Enumeration, HiddenMarkovModel, Inference, MarkovChain, VariableElimination,
};

/// Agreement between the two exact engines.
const AGREE_TOL: f64 = 1e-6;

/// Distance from 1 allowed for normalized results.
const NORM_TOL: f64 = 1e-9;

const MAX_PARENTS: usize = 3;
const MAX_STATES: usize = 3;

fn id(i: usize) -> String {
    format!("X{i}")
}

fn state(s: usize) -> String {
    format!("s{s}")
}

fn max_abs_diff(a: &Distribution, b: &Distribution) -> f64 {
    a.probabilities()
        .iter()
        .zip(b.probabilities())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Node `i` may only have parents `j < i`.
fn build_network(states: &[usize], masks: &[u8], pool: &[f64]) -> Network {
    let n = states.len();
    let mut net = Network::new(ModelKind::Bayesian);
    for i in (0..n).rev() {
        net.add_node_with_states(id(i), format!("var {i}"), (0..states[i]).map(state))
            .unwrap();
    }

    let mut cursor = 0;
    for i in 0..n {
        let parents: Vec<usize> = (0..i)
            .filter(|j| masks[i] & (1 << j) != 0)
            .take(MAX_PARENTS)
            .collect();
        for &p in &parents {
            net.connect(&id(p), &id(i)).unwrap();
        }

        let domains: Vec<Vec<String>> = parents
            .iter()
            .map(|&p| (0..states[p]).map(state).collect())
            .collect();
        for combo in probgraph_prob::math::cartesian_product(&domains) {
            let weights = &pool[cursor..cursor + states[i]];
            cursor += states[i];
            let total: f64 = weights.iter().sum();
            let row: ProbTable = weights
                .iter()
                .enumerate()
                .map(|(s, w)| (state(s), w / total))
                .collect();
            net.set_cpt_row(&id(i), &combo, row).unwrap();
        }
    }
    net
}

fn arb_network() -> impl Strategy<Value = (Network, Vec<usize>)> {
    (2usize..=6)
        .prop_flat_map(|n| {
            let rows = MAX_STATES.pow(MAX_PARENTS as u32);
            (
                prop::collection::vec(2usize..=MAX_STATES, n),
                prop::collection::vec(any::<u8>(), n),
                prop::collection::vec(0.05f64..1.0, n * rows * MAX_STATES),
            )
        })
        .prop_map(|(states, masks, pool)| (build_network(&states, &masks, &pool), states))
}

fn arb_query() -> impl Strategy<Value = ((Network, Vec<usize>), Index, Vec<(Index, Index)>)> {
    (
        arb_network(),
        any::<Index>(),
        prop::collection::vec((any::<Index>(), any::<Index>()), 0..3),
    )
}

fn resolve(states: &[usize], query: &Index, picks: &[(Index, Index)]) -> (String, Assignment) {
    let q = query.index(states.len());
    let evidence = picks
        .iter()
        .map(|(node, s)| {
            let i = node.index(states.len());
            (id(i), state(s.index(states[i])))
        })
        .collect();
    (id(q), evidence)
}

/// Row-stochastic chain with strictly positive entries.
fn arb_chain() -> impl Strategy<Value = Network> {
    (2usize..=5)
        .prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0.05f64..1.0, n), n))
        .prop_map(|rows| {
            let n = rows.len();
            let mut net = Network::new(ModelKind::MarkovChain);
            for i in 0..n {
                net.add_node(id(i), format!("state {i}")).unwrap();
            }
            for (i, row) in rows.iter().enumerate() {
                let total: f64 = row.iter().sum();
                for (j, w) in row.iter().enumerate() {
                    net.set_transition(&id(i), &id(j), w / total).unwrap();
                }
            }
            net
        })
}

/// Two or three hidden states over observations `o0..o2`; some emission
/// entries are left undeclared.
fn arb_hmm() -> impl Strategy<Value = (Network, Vec<String>)> {
    (2usize..=3)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(0.05f64..1.0, n), n),
                prop::collection::vec(prop::collection::vec(0.0f64..1.0, 3), n),
                prop::collection::vec(0usize..4, 1..12),
            )
        })
        .prop_map(|(transitions, emissions, obs)| {
            let n = transitions.len();
            let mut net = Network::new(ModelKind::Hmm);
            for i in 0..n {
                net.add_node(id(i), format!("hidden {i}")).unwrap();
            }
            for i in 0..n {
                let total: f64 = transitions[i].iter().sum();
                for (j, w) in transitions[i].iter().enumerate() {
                    net.set_transition(&id(i), &id(j), w / total).unwrap();
                }
                for (o, &p) in emissions[i].iter().enumerate() {
                    if p > 0.1 {
                        net.set_emission(&id(i), format!("o{o}"), p).unwrap();
                    }
                }
            }
            // o3 is never declared anywhere.
            (net, obs.into_iter().map(|o| format!("o{o}")).collect())
        })
}

// ============================================================================
// Exact inference
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Enumeration and elimination agree entry by entry.
    #[test]
    fn engines_agree(((net, states), query, picks) in arb_query()) {
        let (query, evidence) = resolve(&states, &query, &picks);
        let a = Enumeration::new(&net).query(&query, &evidence).unwrap();
        let b = VariableElimination::new(&net).query(&query, &evidence).unwrap();
        prop_assert!(max_abs_diff(&a, &b) <= AGREE_TOL, "{} | {:?}: {} vs {}", query, evidence, a, b);
    }

    /// Both engines return distributions that sum to one.
    #[test]
    fn results_are_normalized(((net, states), query, picks) in arb_query()) {
        let (query, evidence) = resolve(&states, &query, &picks);
        let a = Enumeration::new(&net).query(&query, &evidence).unwrap();
        let b = VariableElimination::new(&net).query(&query, &evidence).unwrap();
        prop_assert!((a.total() - 1.0).abs() <= NORM_TOL, "enumeration total {}", a.total());
        prop_assert!((b.total() - 1.0).abs() <= NORM_TOL, "elimination total {}", b.total());
    }

    /// The hidden-variable elimination order does not change the answer.
    #[test]
    fn elimination_order_is_irrelevant(((net, states), query, picks) in arb_query()) {
        let (query, evidence) = resolve(&states, &query, &picks);
        let ve = VariableElimination::new(&net);
        let natural = ve.query(&query, &evidence).unwrap();

        let mut order = ve.hidden_variables(&query, &evidence);
        order.reverse();
        let reversed = ve.query_with_order(&query, &evidence, &order).unwrap();

        prop_assert!(max_abs_diff(&natural, &reversed) <= NORM_TOL);
    }

    /// Repeated queries give bit-identical results.
    #[test]
    fn queries_are_idempotent(((net, states), query, picks) in arb_query()) {
        let (query, evidence) = resolve(&states, &query, &picks);
        let engine = Enumeration::new(&net);
        prop_assert_eq!(engine.query(&query, &evidence).unwrap(), engine.query(&query, &evidence).unwrap());
        let engine = VariableElimination::new(&net);
        prop_assert_eq!(engine.query(&query, &evidence).unwrap(), engine.query(&query, &evidence).unwrap());
    }
}

// ============================================================================
// Chains and HMMs
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A positive stochastic matrix converges to a normalized fixed point.
    #[test]
    fn stationary_is_normalized(net in arb_chain()) {
        let result = MarkovChain::new(&net).compute_stationary().unwrap();
        prop_assert!(result.is_converged());
        prop_assert!((result.distribution.total() - 1.0).abs() <= NORM_TOL);
    }

    /// Every forward-backward step is a distribution; lengths match.
    #[test]
    fn forward_backward_steps_are_normalized((net, obs) in arb_hmm()) {
        let hmm = HiddenMarkovModel::new(&net);
        let gammas = hmm.forward_backward(&obs).unwrap();
        prop_assert_eq!(gammas.len(), obs.len());
        for gamma in &gammas {
            prop_assert!((gamma.total() - 1.0).abs() <= NORM_TOL, "step total {}", gamma.total());
        }
        prop_assert_eq!(hmm.viterbi(&obs).unwrap().len(), obs.len());
    }

    /// Plain and rescaled forward agree while the plain one has not underflowed.
    #[test]
    fn forward_log_matches_forward((net, obs) in arb_hmm()) {
        let hmm = HiddenMarkovModel::new(&net);
        let p = hmm.forward(&obs).unwrap();
        let log_p = hmm.forward_log(&obs).unwrap();
        prop_assume!(p > 1e-250);
        prop_assert!((p.ln() - log_p).abs() <= 1e-9 * log_p.abs().max(1.0));
    }
}
