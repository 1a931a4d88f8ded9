//! Result and error types for the core library

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core library error type
///
/// Domain outcomes are typed variants so callers can match on the exact
/// failure. None of these are fatal to the process: the interactive menu
/// reports them and re-prompts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("user not found")]
    UserNotFound,

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid username: {0}")]
    InvalidUsername(&'static str),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("amount exceeds the per-transaction limit")]
    LimitExceeded,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("username can be changed again after {retry_after}")]
    CooldownActive {
        /// When the 30-day rename cooldown expires
        retry_after: DateTime<Utc>,
    },

    #[error("incorrect current password")]
    IncorrectPassword,

    #[error("new password cannot be the same as the current password")]
    SamePassword,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
