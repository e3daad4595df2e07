//! Error types for the library services.

use libris_database::DatabaseError;
use thiserror::Error;

pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// Bad input or a broken circulation rule. Safe to show to the caller.
    #[error("{message}")]
    Validation { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("access denied: {reason}")]
    Forbidden { reason: String },

    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl LibraryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }
}

impl From<DatabaseError> for LibraryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate(what) => Self::validation(format!("{what} already exists")),
            DatabaseError::NotFound(what) => Self::NotFound { what },
            other => Self::Database(other),
        }
    }
}
