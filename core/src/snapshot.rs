//! In-memory action snapshot loaded from a JSON array file.
//!
//! The snapshot owns its action list. Readers always get a copy, so a
//! reload never changes data a caller is already working on.

use crate::{
    action::Action,
    error::{AnalyticsError, AnalyticsResult},
    source::ActionSource,
    types::UserId,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub struct ActionSnapshot {
    actions: RwLock<Vec<Action>>,
    path: Option<PathBuf>, // None when built from memory
}

impl ActionSnapshot {
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self {
            actions: RwLock::new(actions),
            path: None,
        }
    }

    pub fn from_json_str(json: &str) -> AnalyticsResult<Self> {
        let actions: Vec<Action> = serde_json::from_str(json)?;
        Ok(Self::from_actions(actions))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let path = path.as_ref();
        let actions: Vec<Action> = read_json_file(path)?;
        log::info!("snapshot: loaded {} actions from {}", actions.len(), path.display());
        Ok(Self {
            actions: RwLock::new(actions),
            path: Some(path.to_path_buf()),
        })
    }

    /// Re-read the backing file and swap the action list in one step.
    /// Snapshots built from memory have nothing to reload.
    /// Returns the number of actions now held.
    pub fn reload(&self) -> AnalyticsResult<usize> {
        let Some(path) = &self.path else {
            log::debug!("snapshot: reload skipped, no backing file");
            return self.len();
        };
        let fresh: Vec<Action> = read_json_file(path)?;
        let count = fresh.len();
        let mut guard = self
            .actions
            .write()
            .map_err(|_| AnalyticsError::SnapshotPoisoned)?;
        *guard = fresh;
        log::info!("snapshot: reloaded {count} actions from {}", path.display());
        Ok(count)
    }

    pub fn len(&self) -> AnalyticsResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> AnalyticsResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> AnalyticsResult<std::sync::RwLockReadGuard<'_, Vec<Action>>> {
        self.actions
            .read()
            .map_err(|_| AnalyticsError::SnapshotPoisoned)
    }
}

impl ActionSource for ActionSnapshot {
    fn all_actions(&self) -> AnalyticsResult<Vec<Action>> {
        Ok(self.read()?.clone())
    }

    fn actions_for_user(&self, user_id: UserId) -> AnalyticsResult<Vec<Action>> {
        Ok(self
            .read()?
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Read and decode a whole JSON file.
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> AnalyticsResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| AnalyticsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
