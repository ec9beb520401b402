//! Referral graph and referral index.
//!
//! The graph has one edge referrer → target per referral action, in the
//! order the actions were read. Referring the same user twice is two edges.
//!
//! The index of a referrer is the number of hops reachable through its
//! outgoing edges: each edge counts 1, plus the index of its target.
//!
//! CYCLES: a target that is still being resolved contributes 1 plus its
//! provisional value, which is 0 until the node finishes. Cycles therefore
//! truncate instead of failing. Roots are resolved in ascending user id so
//! the truncation point is stable across runs.
//!
//! Counts multiply along duplicate edges and shared descendants, so every
//! accumulation saturates at `u64::MAX` instead of overflowing.

use crate::{action::Action, types::UserId};
use std::collections::{BTreeMap, HashMap};

/// Referrer → referred users, duplicates kept, per-referrer order preserved.
pub type ReferralGraph = BTreeMap<UserId, Vec<UserId>>;

/// Referrer → number of reachable hops. Only referrers appear as keys.
pub type ReferralIndex = BTreeMap<UserId, u64>;

/// Build the referral graph from every action of `referral_type`.
/// Users that are only ever referred are not keys.
pub fn build_referral_graph(actions: &[Action], referral_type: &str) -> ReferralGraph {
    let mut graph = ReferralGraph::new();
    for action in actions.iter().filter(|a| a.is_type(referral_type)) {
        graph
            .entry(action.user_id)
            .or_default()
            .push(action.target_user);
    }
    graph
}

/// Compute the referral index of every referrer in `graph`.
pub fn compute_referral_index(graph: &ReferralGraph) -> ReferralIndex {
    let mut resolver = IndexResolver::new(graph);
    for &root in graph.keys() {
        resolver.resolve(root);
    }

    if resolver.truncations > 0 {
        log::warn!(
            "referral: {} cycle revisits truncated while indexing {} referrers",
            resolver.truncations,
            graph.len()
        );
    }
    resolver.finish()
}

/// One edge: the hop itself plus everything its target reaches.
fn add_hop(sum: u64, target_index: u64) -> u64 {
    sum.saturating_add(target_index.saturating_add(1))
}

#[derive(Debug, Clone, Copy)]
enum NodeState {
    InProgress,
    Resolved(u64),
}

struct Frame<'g> {
    user: UserId,
    targets: &'g [UserId],
    next: usize,
    sum: u64,
}

/// Memoized depth-first resolution over an explicit stack.
struct IndexResolver<'g> {
    graph: &'g ReferralGraph,
    states: HashMap<UserId, NodeState>,
    truncations: usize,
}

impl<'g> IndexResolver<'g> {
    fn new(graph: &'g ReferralGraph) -> Self {
        Self {
            graph,
            states: HashMap::with_capacity(graph.len()),
            truncations: 0,
        }
    }

    fn frame(&mut self, user: UserId, targets: &'g [UserId]) -> Frame<'g> {
        self.states.insert(user, NodeState::InProgress);
        Frame {
            user,
            targets,
            next: 0,
            sum: 0,
        }
    }

    fn resolve(&mut self, root: UserId) {
        if self.states.contains_key(&root) {
            return;
        }
        let graph = self.graph;
        let Some(targets) = graph.get(&root) else {
            return;
        };

        let mut stack = vec![self.frame(root, targets)];

        while let Some(top) = stack.last_mut() {
            if top.next == top.targets.len() {
                let (user, sum) = (top.user, top.sum);
                stack.pop();
                self.states.insert(user, NodeState::Resolved(sum));
                if let Some(parent) = stack.last_mut() {
                    parent.sum = add_hop(parent.sum, sum);
                }
                continue;
            }

            let target = top.targets[top.next];
            top.next += 1;

            match self.states.get(&target).copied() {
                Some(NodeState::Resolved(count)) => top.sum = add_hop(top.sum, count),
                Some(NodeState::InProgress) => {
                    log::debug!(
                        "referral: cycle at {} -> {target}, using provisional 0",
                        top.user
                    );
                    self.truncations += 1;
                    top.sum = add_hop(top.sum, 0);
                }
                None => match graph.get(&target) {
                    Some(next_targets) => {
                        let frame = self.frame(target, next_targets);
                        stack.push(frame);
                    }
                    // Never referred anyone: a leaf worth one hop.
                    None => top.sum = add_hop(top.sum, 0),
                },
            }
        }
    }

    fn finish(self) -> ReferralIndex {
        self.states
            .into_iter()
            .filter_map(|(user, state)| match state {
                NodeState::Resolved(count) => Some((user, count)),
                NodeState::InProgress => None,
            })
            .collect()
    }
}
