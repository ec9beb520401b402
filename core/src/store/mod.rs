//! SQLite persistence layer for the action log and the user directory.
//!
//! RULE: Only the store modules talk to the database.
//! The analytics engine reads through ActionSource and never executes SQL.

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

mod action;
mod user;

pub struct AnalyticsStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl AnalyticsStore {
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    pub fn reopen(&self) -> AnalyticsResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Safe to run more than once.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_actions.sql"))?;
        Ok(())
    }
}

// ── Timestamp columns ─────────────────────────────────────────────

fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn decode_timestamp(value: String) -> AnalyticsResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| AnalyticsError::InvalidTimestamp { value })
}
