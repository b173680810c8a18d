//! Error types for studentdb

use thiserror::Error;

/// Result type alias for studentdb operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// Could not reach or bind to the store
    #[error("Connection error: {0}")]
    Connection(String),

    /// The driver rejected or failed to run a statement
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// A condition string that is not of the form `field=value`
    #[error("Malformed condition: {0:?} (expected `field=value`)")]
    MalformedCondition(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl DbError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error comes from malformed caller input
    pub fn is_malformed_condition(&self) -> bool {
        matches!(self, Self::MalformedCondition(_))
    }

    /// The server-side error reported by PostgreSQL, if any.
    ///
    /// Driver errors are never translated; use this to inspect the SQLSTATE code.
    pub fn as_db_error(&self) -> Option<&tokio_postgres::error::DbError> {
        match self {
            Self::Query(err) => err.as_db_error(),
            _ => None,
        }
    }
}
