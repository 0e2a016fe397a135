//! Error types for duosql

use thiserror::Error;

/// Result type alias for duosql operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Could not open or reach the backend
    #[error("Connection error: {0}")]
    Connection(String),

    /// Remote engine failure, carried unmodified
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Embedded engine failure, carried unmodified
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Caller data cannot be turned into a well-formed statement
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid or incomplete configuration
    #[error("Config error: {0}")]
    Config(String),

    /// The blocking task running an embedded statement failed
    #[error("Task error: {0}")]
    Task(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Create a shape mismatch error
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a shape mismatch error
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// Check if the backend rejected the statement on a unique or primary key constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Postgres(err) => err
                .as_db_error()
                .is_some_and(|db| db.code().code() == "23505"),
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            ),
            _ => false,
        }
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        // Backend errors surfaced through the pool keep their native type.
        match err {
            deadpool_postgres::PoolError::Backend(e) => Self::Postgres(e),
            other => Self::Pool(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for DbError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
