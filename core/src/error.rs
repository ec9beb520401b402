use crate::types::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid user ID: {id}")]
    InvalidUserId { id: UserId },

    #[error("Invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("Action snapshot lock poisoned")]
    SnapshotPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
