use super::{decode_timestamp, encode_timestamp, AnalyticsStore};
use crate::{
    error::AnalyticsResult,
    types::UserId,
    users::{check_user_id, User, UserDirectory},
};
use rusqlite::{params, OptionalExtension};

fn user_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<(UserId, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_user((id, name, created_at): (UserId, String, String)) -> AnalyticsResult<User> {
    Ok(User {
        id,
        name,
        created_at: decode_timestamp(created_at)?,
    })
}

impl AnalyticsStore {
    // ── User ──────────────────────────────────────────────────

    pub fn insert_user(&self, u: &User) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO app_user (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![u.id, &u.name, encode_timestamp(&u.created_at)],
        )?;
        Ok(())
    }

    pub fn import_users(&self, users: &[User]) -> AnalyticsResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO app_user (user_id, name, created_at) VALUES (?1, ?2, ?3)")?;
            for u in users {
                stmt.execute(params![u.id, &u.name, encode_timestamp(&u.created_at)])?;
            }
        }
        tx.commit()?;
        log::info!("store: imported {} users", users.len());
        Ok(users.len())
    }

    pub fn user_count(&self) -> AnalyticsResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM app_user", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

impl UserDirectory for AnalyticsStore {
    fn user_by_id(&self, id: UserId) -> AnalyticsResult<Option<User>> {
        check_user_id(id)?;
        let row = self
            .conn
            .query_row(
                "SELECT user_id, name, created_at FROM app_user WHERE user_id = ?1",
                params![id],
                user_row_mapper,
            )
            .optional()?;
        row.map(into_user).transpose()
    }

    fn all_users(&self) -> AnalyticsResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, name, created_at FROM app_user ORDER BY user_id ASC")?;
        let rows = stmt
            .query_map([], user_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_user).collect()
    }
}
