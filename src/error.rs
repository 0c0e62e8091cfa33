//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP-level failure talking to the task service.
    #[error("task service request failed: {0}")]
    Fetch(String),

    /// A recurrence rule that cannot be evaluated (unknown interval,
    /// malformed weekday set).
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(String),

    /// A move that did not fully apply. `materialized_id` is set when a
    /// virtual occurrence was materialized before the move step failed, so
    /// the caller can retry the move without creating a second row.
    #[error("move failed: {reason}")]
    Move {
        reason: String,
        materialized_id: Option<i64>,
    },

    /// Desktop notification could not be shown.
    #[error("notification delivery failed: {0}")]
    Notify(String),

    /// Unreadable or malformed configuration file.
    #[error("configuration error: {0}")]
    Config(String),

    /// The environment refused alert permission.
    #[error("notifications are not permitted")]
    PermissionDenied,
}

impl Error {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::InvalidRule(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}
