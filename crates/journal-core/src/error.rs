//! Error taxonomy shared by the auth and journal services

use thiserror::Error;

/// Message returned for any failed login, whether the user exists or not
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Duplicate registration
    #[error("{0}")]
    Conflict(String),

    /// Bad username/password pair
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session token was presented
    #[error("No token provided")]
    MissingToken,

    /// Token failed signature, format, version or expiry checks.
    /// The reason is for logs only.
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    /// Authenticated, but not the owner of the record
    #[error("Forbidden")]
    Forbidden,

    #[error("Journal not found")]
    NotFound,

    /// Hashing failure, panicked worker or anything unexpected.
    /// The detail is for logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
