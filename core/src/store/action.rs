use super::{decode_timestamp, encode_timestamp, AnalyticsStore};
use crate::{
    action::Action,
    error::AnalyticsResult,
    source::ActionSource,
    types::{ActionId, UserId},
};
use rusqlite::params;

/// Action row as stored; the timestamp is decoded after the query.
struct ActionRow {
    id: ActionId,
    action_type: String,
    user_id: UserId,
    target_user: UserId,
    created_at: String,
}

impl ActionRow {
    fn into_action(self) -> AnalyticsResult<Action> {
        Ok(Action {
            id: self.id,
            action_type: self.action_type,
            user_id: self.user_id,
            target_user: self.target_user,
            created_at: decode_timestamp(self.created_at)?,
        })
    }
}

fn action_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActionRow> {
    Ok(ActionRow {
        id: row.get(0)?,
        action_type: row.get(1)?,
        user_id: row.get(2)?,
        target_user: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl AnalyticsStore {
    // ── Action ──────────────────────────────────────────────────

    pub fn insert_action(&self, a: &Action) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO action_log (action_id, action_type, user_id, target_user, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                a.id,
                &a.action_type,
                a.user_id,
                a.target_user,
                encode_timestamp(&a.created_at),
            ],
        )?;
        Ok(())
    }

    /// Insert a batch of actions in one transaction, preserving their order.
    pub fn import_actions(&self, actions: &[Action]) -> AnalyticsResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO action_log (action_id, action_type, user_id, target_user, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for a in actions {
                stmt.execute(params![
                    a.id,
                    &a.action_type,
                    a.user_id,
                    a.target_user,
                    encode_timestamp(&a.created_at),
                ])?;
            }
        }
        tx.commit()?;
        log::info!("store: imported {} actions", actions.len());
        Ok(actions.len())
    }

    pub fn action_count(&self) -> AnalyticsResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM action_log", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn actions(&self) -> AnalyticsResult<Vec<Action>> {
        let mut stmt = self.conn.prepare(
            "SELECT action_id, action_type, user_id, target_user, created_at
             FROM action_log ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map([], action_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ActionRow::into_action).collect()
    }

    pub fn actions_by_user(&self, user_id: UserId) -> AnalyticsResult<Vec<Action>> {
        let mut stmt = self.conn.prepare(
            "SELECT action_id, action_type, user_id, target_user, created_at
             FROM action_log WHERE user_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id], action_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ActionRow::into_action).collect()
    }
}

impl ActionSource for AnalyticsStore {
    fn all_actions(&self) -> AnalyticsResult<Vec<Action>> {
        self.actions()
    }

    fn actions_for_user(&self, user_id: UserId) -> AnalyticsResult<Vec<Action>> {
        self.actions_by_user(user_id)
    }
}
