//! Referral graph construction and referral index resolution.

use action_analytics_core::{
    action::Action,
    referral::{build_referral_graph, compute_referral_index, ReferralGraph, ReferralIndex},
    types::REFERRAL_ACTION_TYPE,
};
use chrono::{Duration, TimeZone, Utc};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn graph(edges: &[(i64, i64)]) -> ReferralGraph {
    let mut g = ReferralGraph::new();
    for &(from, to) in edges {
        g.entry(from).or_default().push(to);
    }
    g
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn index(pairs: &[(i64, u64)]) -> ReferralIndex {
    pairs.iter().copied().collect()
}

fn refer(id: i64, from: i64, to: i64) -> Action {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 11, 20, 0, 0).unwrap();
    Action::new(id, REFERRAL_ACTION_TYPE, from, to, t0 + Duration::seconds(id))
}

// ── Graph construction ───────────────────────────────────────────────────────

#[test]
fn graph_keeps_referral_order_and_duplicates() {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 11, 20, 0, 0).unwrap();
    let actions = vec![
        refer(1, 2, 3),
        Action::new(2, "LOGIN", 2, 0, t0),
        refer(3, 2, 0),
        refer(4, 2, 3),
        refer(5, 1, 2),
    ];

    let g = build_referral_graph(&actions, REFERRAL_ACTION_TYPE);
    assert_eq!(g, graph(&[(2, 3), (2, 0), (2, 3), (1, 2)]));
    assert!(!g.contains_key(&3), "referred-only users are not keys");
}

#[test]
fn graph_uses_the_given_referral_type() {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 11, 20, 0, 0).unwrap();
    let actions = vec![
        Action::new(1, "INVITE", 1, 2, t0),
        refer(2, 1, 3),
    ];

    let g = build_referral_graph(&actions, "INVITE");
    assert_eq!(g, graph(&[(1, 2)]));
}

// ── Index resolution ─────────────────────────────────────────────────────────

/// 1→2→3→4: every referrer reaches everyone below it; 4 is not a key.
#[test]
fn linear_chain() {
    let result = compute_referral_index(&graph(&[(1, 2), (2, 3), (3, 4)]));
    assert_eq!(result, index(&[(1, 3), (2, 2), (3, 1)]));
}

/// Fan-out with leaf-only targets lists only the referrer.
#[test]
fn fan_out() {
    let result = compute_referral_index(&graph(&[(1, 2), (1, 3), (1, 4)]));
    assert_eq!(result, index(&[(1, 3)]));
}

/// A referrer with an explicitly empty adjacency list appears with 0.
#[test]
fn empty_adjacency_key_is_zero() {
    let mut g = graph(&[(1, 2), (1, 3)]);
    g.insert(2, Vec::new());
    g.insert(3, Vec::new());

    let result = compute_referral_index(&g);
    assert_eq!(result, index(&[(1, 2), (2, 0), (3, 0)]));
}

/// Referring the same target twice counts two hops.
#[test]
fn duplicate_edges_count_separately() {
    let result = compute_referral_index(&graph(&[(2, 3), (2, 0), (2, 3)]));
    assert_eq!(result, index(&[(2, 3)]));
}

/// Shared descendants are counted once per path that reaches them.
#[test]
fn diamond_counts_each_path() {
    // 1→2, 1→3, 2→4, 3→4
    let result = compute_referral_index(&graph(&[(1, 2), (1, 3), (2, 4), (3, 4)]));
    assert_eq!(result, index(&[(1, 4), (2, 1), (3, 1)]));
}

/// A two-node cycle truncates at the revisit instead of looping.
#[test]
fn two_node_cycle_truncates() {
    init_logging();
    let result = compute_referral_index(&graph(&[(1, 2), (2, 1)]));
    assert_eq!(result, index(&[(1, 2), (2, 1)]));
}

/// A self-referral counts one hop against the provisional zero.
#[test]
fn self_referral() {
    init_logging();
    let result = compute_referral_index(&graph(&[(5, 5)]));
    assert_eq!(result, index(&[(5, 1)]));
}

/// 1→2→3→1 resolved from the lowest id.
#[test]
fn three_node_cycle_truncates_at_root() {
    init_logging();
    let result = compute_referral_index(&graph(&[(1, 2), (2, 3), (3, 1)]));
    assert_eq!(result, index(&[(1, 3), (2, 2), (3, 1)]));
}

/// Resolution order is fixed, so cyclic graphs give the same answer every time.
#[test]
fn cyclic_results_are_stable() {
    init_logging();
    let g = graph(&[(4, 1), (1, 2), (2, 3), (3, 1), (3, 9)]);
    let first = compute_referral_index(&g);
    for _ in 0..10 {
        assert_eq!(compute_referral_index(&g), first);
    }
}

#[test]
fn empty_graph_yields_empty_index() {
    assert!(compute_referral_index(&ReferralGraph::new()).is_empty());
}

/// Long chains resolve without exhausting the call stack.
#[test]
fn deep_chain_does_not_overflow() {
    const DEPTH: i64 = 200_000;
    let edges: Vec<(i64, i64)> = (1..=DEPTH).map(|u| (u, u + 1)).collect();

    let result = compute_referral_index(&graph(&edges));
    assert_eq!(result.len(), DEPTH as usize);
    assert_eq!(result[&1], DEPTH as u64);
    assert_eq!(result[&DEPTH], 1);
}

/// Doubled edges double the count at every level; the top of the chain
/// saturates instead of overflowing.
#[test]
fn doubling_chain_saturates() {
    init_logging();
    let edges: Vec<(i64, i64)> = (1..=70).flat_map(|u| [(u, u + 1), (u, u + 1)]).collect();

    let result = compute_referral_index(&graph(&edges));
    assert_eq!(result.len(), 70);
    assert_eq!(result[&70], 2);
    assert_eq!(result[&69], 6);
    // 2^(72 - u) - 2 still fits at u = 8.
    assert_eq!(result[&8], u64::MAX - 1);
    assert_eq!(result[&7], u64::MAX);
    assert_eq!(result[&1], u64::MAX);
}
