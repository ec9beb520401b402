//! The read-only action source contract.
//!
//! RULE: The analytics engine reads actions ONLY through ActionSource.
//! How actions are loaded or persisted is the implementor's business.
//! Every call must return a consistent point-in-time view.

use crate::{action::Action, error::AnalyticsResult, types::UserId};
use std::sync::Arc;

/// The contract every action store must fulfill.
pub trait ActionSource: Send {
    /// Every action, in the order the store holds them.
    fn all_actions(&self) -> AnalyticsResult<Vec<Action>>;

    /// The actions performed by one user, in store order.
    /// An unknown user yields an empty vec, not an error.
    fn actions_for_user(&self, user_id: UserId) -> AnalyticsResult<Vec<Action>>;
}

impl<S: ActionSource + Sync> ActionSource for Arc<S> {
    fn all_actions(&self) -> AnalyticsResult<Vec<Action>> {
        self.as_ref().all_actions()
    }

    fn actions_for_user(&self, user_id: UserId) -> AnalyticsResult<Vec<Action>> {
        self.as_ref().actions_for_user(user_id)
    }
}
