//! The action record — one timestamped event in the log.

use crate::types::{ActionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user action. Never mutated after load.
///
/// JSON layout matches the action data files:
/// `{"id", "type", "userId", "targetUser", "createdAt"}`.
/// `targetUser` may be omitted and then reads as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: ActionId,
    #[serde(rename = "type")]
    pub action_type: String,
    pub user_id: UserId,
    #[serde(default)]
    pub target_user: UserId,
    pub created_at: DateTime<Utc>,
}

impl Action {
    pub fn new(
        id: ActionId,
        action_type: impl Into<String>,
        user_id: UserId,
        target_user: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            action_type: action_type.into(),
            user_id,
            target_user,
            created_at,
        }
    }

    pub fn is_type(&self, action_type: &str) -> bool {
        self.action_type == action_type
    }
}
