// src/error.rs
// Storage-layer errors shared by every store

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A uniqueness or capacity rule would be broken by the write.
    #[error("{0}")]
    Conflict(String),

    /// The input was rejected before touching the database.
    #[error("{0}")]
    Invalid(String),

    /// A stored row holds a value the model cannot represent.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// True when the database rejected a write on a UNIQUE/PRIMARY KEY constraint.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db) => db.is_unique_violation(),
            _ => false,
        }
    }
}

/// Current Unix time in seconds.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Trim a required text field and reject it when empty.
pub fn require_text(field: &str, value: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::invalid(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Normalise optional text: surrounding whitespace removed, blank becomes None.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
