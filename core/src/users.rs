//! User directory — lookup of user records by id.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    snapshot::read_json_file,
    types::UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub trait UserDirectory {
    /// Look up one user. Ids must be positive; an unknown id is `Ok(None)`.
    fn user_by_id(&self, id: UserId) -> AnalyticsResult<Option<User>>;

    fn all_users(&self) -> AnalyticsResult<Vec<User>>;
}

/// Reject ids that can never name a user.
pub(crate) fn check_user_id(id: UserId) -> AnalyticsResult<()> {
    if id <= 0 {
        return Err(AnalyticsError::InvalidUserId { id });
    }
    Ok(())
}

/// Users held in memory, loaded from a JSON array file.
#[derive(Debug, Clone, Default)]
pub struct UserSnapshot {
    users: Vec<User>,
}

impl UserSnapshot {
    pub fn from_users(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn from_json_str(json: &str) -> AnalyticsResult<Self> {
        Ok(Self::from_users(serde_json::from_str(json)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let users: Vec<User> = read_json_file(path.as_ref())?;
        log::info!(
            "users: loaded {} users from {}",
            users.len(),
            path.as_ref().display()
        );
        Ok(Self::from_users(users))
    }
}

impl UserDirectory for UserSnapshot {
    fn user_by_id(&self, id: UserId) -> AnalyticsResult<Option<User>> {
        check_user_id(id)?;
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    fn all_users(&self) -> AnalyticsResult<Vec<User>> {
        Ok(self.users.clone())
    }
}
