//! Error types for SQLite operations.

use rusqlite::ffi;
use thiserror::Error;

use songbook_query::error::QueryError;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Pool error.
    #[error("Pool error: {0}")]
    Pool(String),
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),
    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),
    /// Timed out waiting for a pooled connection.
    #[error("Timeout error: {0}")]
    Timeout(String),
}

impl SqliteError {
    /// Create a pool error.
    pub fn pool(msg: impl Into<String>) -> Self {
        Self::Pool(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a migration error.
    pub fn migration(msg: impl Into<String>) -> Self {
        Self::Migration(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// The extended SQLite result code, for constraint failures.
    pub fn extended_code(&self) -> Option<i32> {
        match self {
            Self::Sqlite(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))) => {
                Some(e.extended_code)
            }
            _ => None,
        }
    }

    /// Whether a UNIQUE or PRIMARY KEY constraint rejected the statement.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.extended_code(),
            Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        )
    }

    /// Whether a FOREIGN KEY constraint rejected the statement.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.extended_code() == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }

    /// Whether a statement decoded a column into the wrong type.
    fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(tokio_rusqlite::Error::Rusqlite(
                rusqlite::Error::InvalidColumnType(..)
                    | rusqlite::Error::FromSqlConversionFailure(..)
                    | rusqlite::Error::InvalidColumnIndex(_)
                    | rusqlite::Error::InvalidColumnName(_)
            ))
        )
    }
}

impl From<rusqlite::Error> for SqliteError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(tokio_rusqlite::Error::Rusqlite(err))
    }
}

impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        let message = err.to_string();
        let base = if err.is_unique_violation() {
            QueryError::new(songbook_query::ErrorCode::UniqueConstraint, message)
        } else if err.is_foreign_key_violation() {
            QueryError::new(songbook_query::ErrorCode::ForeignKeyConstraint, message)
        } else if err.is_decode_failure() {
            QueryError::deserialization(message)
        } else {
            match &err {
                SqliteError::Pool(_) | SqliteError::Connection(_) => QueryError::connection(message),
                SqliteError::Timeout(_) => QueryError::new(songbook_query::ErrorCode::PoolExhausted, message),
                SqliteError::Config(_) => QueryError::configuration(message),
                SqliteError::Migration(_) | SqliteError::Sqlite(_) => QueryError::database(message),
            }
        };
        base.with_source(err)
    }
}
