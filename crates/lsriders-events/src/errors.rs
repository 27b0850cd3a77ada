//! Error types for the event access layer.
//!
//! [`EventStoreError`] is returned by every repository and store operation.
//! [`EventStoreError::kind`] folds the variants into the three outcomes a
//! caller has to distinguish: bad input, missing record, or a storage fault.

use thiserror::Error;

use crate::types::EventId;

/// Errors that can occur during event access operations.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Malformed or semantically illegal input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced event does not exist.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Store configuration could not be built from settings.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (e.g. poisoned lock, worker panic).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`EventStoreError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad input.
    InvalidArgument,
    /// Referenced id does not exist.
    NotFound,
    /// The backing store (or its setup) failed.
    StorageFailure,
}

impl ErrorKind {
    /// Stable lowercase label, used for metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl EventStoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Sqlite(_)
            | Self::Pool(_)
            | Self::Migration { .. }
            | Self::InvalidConfig(_)
            | Self::Internal(_) => ErrorKind::StorageFailure,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Convenience type alias for event access results.
pub type Result<T> = std::result::Result<T, EventStoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display() {
        let err = EventStoreError::InvalidArgument("a new event cannot already have an id".into());
        assert_eq!(
            err.to_string(),
            "invalid argument: a new event cannot already have an id"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn not_found_display() {
        let err = EventStoreError::NotFound(42);
        assert_eq!(err.to_string(), "event not found: 42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn sqlite_errors_are_storage_failures() {
        let err: EventStoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, EventStoreError::Sqlite(_)));
        assert!(err.to_string().contains("sqlite error"));
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
    }

    #[test]
    fn migration_error_display() {
        let err = EventStoreError::Migration {
            message: "v001 failed: disk full".into(),
        };
        assert_eq!(err.to_string(), "migration error: v001 failed: disk full");
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ErrorKind::InvalidArgument.as_str(), "invalid_argument");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::StorageFailure.as_str(), "storage_failure");
    }
}
