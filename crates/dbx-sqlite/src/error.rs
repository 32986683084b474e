//! Error types for the SQLite executor.

use dbx_core::DbxError;

/// Errors raised while talking to SQLite.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// The driver failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The runtime could not be started.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A column value has a storage class the engine cannot represent.
    #[error("Unsupported value of type '{type_name}' in column '{column}'")]
    UnsupportedValue {
        /// Column name.
        column: String,
        /// SQLite type name.
        type_name: String,
    },
}

/// Result type for SQLite operations.
pub type Result<T> = std::result::Result<T, SqliteError>;

impl From<SqliteError> for DbxError {
    fn from(err: SqliteError) -> Self {
        Self::Query(err.to_string())
    }
}
