//! Transition model — first-order next-action statistics.
//!
//! Actions are grouped per user and ordered by created_at. Every
//! consecutive pair (a[i], a[i+1]) of one user is a transition.
//! A user's last action has no successor and never starts a transition.

use crate::{action::Action, config::MAX_PROBABILITY_DECIMALS, types::UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decimal places used for probabilities unless configured otherwise.
pub const DEFAULT_PROBABILITY_DECIMALS: u32 = 2;

/// Raw transition counts out of one action type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCounts {
    /// Next action type → number of times it followed the source type.
    pub counts: BTreeMap<String, u64>,
    /// Number of transitions observed; always the sum of `counts`.
    pub total: u64,
}

impl TransitionCounts {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Empirical probability of each next action type, rounded half away
    /// from zero to `decimals` places, capped at `MAX_PROBABILITY_DECIMALS`.
    /// Empty when no transition was seen.
    pub fn probabilities(&self, decimals: u32) -> BTreeMap<String, f64> {
        if self.total == 0 {
            return BTreeMap::new();
        }
        let places = decimals.min(MAX_PROBABILITY_DECIMALS) as i32;
        let scale = 10f64.powi(places);
        let total = self.total as f64;
        self.counts
            .iter()
            .map(|(next_type, &count)| {
                let probability = count as f64 / total;
                (next_type.clone(), (probability * scale).round() / scale)
            })
            .collect()
    }
}

/// Group actions by user, each group sorted by created_at ascending.
/// The sort is stable: equal timestamps keep their input order.
pub fn user_sequences(actions: &[Action]) -> BTreeMap<UserId, Vec<&Action>> {
    let mut sequences: BTreeMap<UserId, Vec<&Action>> = BTreeMap::new();
    for action in actions {
        sequences.entry(action.user_id).or_default().push(action);
    }
    for sequence in sequences.values_mut() {
        sequence.sort_by_key(|a| a.created_at);
    }
    sequences
}

/// Count which action types immediately follow `from_type`, per user.
/// Type strings are compared exactly.
pub fn next_action_counts(actions: &[Action], from_type: &str) -> TransitionCounts {
    let mut result = TransitionCounts::default();

    for sequence in user_sequences(actions).values() {
        for pair in sequence.windows(2) {
            if pair[0].is_type(from_type) {
                *result.counts.entry(pair[1].action_type.clone()).or_insert(0) += 1;
                result.total += 1;
            }
        }
    }

    log::debug!(
        "transition: {} transitions out of {from_type} across {} next types",
        result.total,
        result.counts.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> TransitionCounts {
        let counts: BTreeMap<String, u64> =
            pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect();
        let total: u64 = counts.values().sum();
        TransitionCounts { counts, total }
    }

    #[test]
    fn probabilities_round_to_two_places() {
        let c = counts(&[("VIEW_PROFILE", 1), ("LOGOUT", 2)]);
        let p = c.probabilities(DEFAULT_PROBABILITY_DECIMALS);
        assert_eq!(p["VIEW_PROFILE"], 0.33);
        assert_eq!(p["LOGOUT"], 0.67);
    }

    #[test]
    fn probabilities_quarters_are_exact() {
        let c = counts(&[("VIEW_PROFILE", 3), ("LOGOUT", 1)]);
        let p = c.probabilities(DEFAULT_PROBABILITY_DECIMALS);
        assert_eq!(p["VIEW_PROFILE"], 0.75);
        assert_eq!(p["LOGOUT"], 0.25);
    }

    #[test]
    fn half_rounds_away_from_zero() {
        // 1/8 = 0.125 exactly
        let c = counts(&[("A", 1), ("B", 7)]);
        let p = c.probabilities(DEFAULT_PROBABILITY_DECIMALS);
        assert_eq!(p["A"], 0.13);
    }

    #[test]
    fn excessive_precision_is_capped() {
        let c = counts(&[("VIEW_PROFILE", 1), ("LOGOUT", 2)]);
        let capped = c.probabilities(MAX_PROBABILITY_DECIMALS);
        assert_eq!(c.probabilities(u32::MAX), capped);
        assert_eq!(c.probabilities(MAX_PROBABILITY_DECIMALS + 1), capped);
        assert!((capped["VIEW_PROFILE"] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_counts_yield_empty_probabilities() {
        let c = TransitionCounts::default();
        assert!(c.is_empty());
        assert!(c.probabilities(DEFAULT_PROBABILITY_DECIMALS).is_empty());
    }
}
