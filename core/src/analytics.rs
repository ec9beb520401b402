//! The analytics facade — the calls a web layer makes.
//!
//! RULES:
//!   - Every call reads the full action set from the source exactly once.
//!   - Nothing is cached between calls; each call recomputes from scratch.
//!   - Source errors propagate unchanged.
//!   - Action types are compared exactly as given. Case normalization
//!     belongs to the caller.

use crate::{
    config::AnalyticsConfig,
    error::AnalyticsResult,
    referral::{build_referral_graph, compute_referral_index, ReferralGraph, ReferralIndex},
    source::ActionSource,
    transition::{next_action_counts, TransitionCounts},
    types::UserId,
};
use std::collections::BTreeMap;

pub struct ActionAnalytics<S> {
    source: S,
    config: AnalyticsConfig,
}

impl<S: ActionSource> ActionAnalytics<S> {
    pub fn new(source: S, config: AnalyticsConfig) -> Self {
        Self { source, config }
    }

    /// Facade over `source` with the default configuration.
    pub fn with_defaults(source: S) -> Self {
        Self::new(source, AnalyticsConfig::default())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Raw counts of the actions that immediately follow `action_type`.
    pub fn next_action_counts(&self, action_type: &str) -> AnalyticsResult<TransitionCounts> {
        let actions = self.source.all_actions()?;
        Ok(next_action_counts(&actions, action_type))
    }

    /// Probability of each action type immediately following `action_type`.
    /// Empty when `action_type` is never followed by anything.
    pub fn next_action_probabilities(
        &self,
        action_type: &str,
    ) -> AnalyticsResult<BTreeMap<String, f64>> {
        let counts = self.next_action_counts(action_type)?;
        let probabilities = counts.probabilities(self.config.probability_decimals);
        log::debug!(
            "analytics: next-action probabilities for {action_type} over {} transitions",
            counts.total
        );
        Ok(probabilities)
    }

    pub fn referral_graph(&self) -> AnalyticsResult<ReferralGraph> {
        let actions = self.source.all_actions()?;
        Ok(build_referral_graph(
            &actions,
            &self.config.referral_action_type,
        ))
    }

    /// Number of users each referrer reached through its referral chains.
    pub fn referral_index(&self) -> AnalyticsResult<ReferralIndex> {
        let graph = self.referral_graph()?;
        let index = compute_referral_index(&graph);
        log::debug!(
            "analytics: referral index over {} referrers, {} edges",
            graph.len(),
            graph.values().map(Vec::len).sum::<usize>()
        );
        Ok(index)
    }

    /// Number of actions performed by one user.
    pub fn user_action_count(&self, user_id: UserId) -> AnalyticsResult<usize> {
        Ok(self.source.actions_for_user(user_id)?.len())
    }
}
