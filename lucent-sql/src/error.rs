//! Errors raised by the SQL backend.

use lucent_query::SearchError;
use thiserror::Error;

/// Result type for SQL backend operations.
pub type SqlResult<T> = Result<T, SqlError>;

/// SQL backend errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// A column name that cannot be quoted safely.
    #[error("invalid column name `{0}`")]
    InvalidColumn(String),

    /// The value-fetch executor failed.
    #[error("value query failed: {0}")]
    Executor(String),

    /// A row returned by introspection could not be read.
    #[error("invalid introspection row: {0}")]
    InvalidRow(String),
}

impl From<SqlError> for SearchError {
    fn from(err: SqlError) -> Self {
        match err {
            SqlError::InvalidRow(message) => SearchError::introspection(message),
            other => SearchError::backend("sql", other.to_string()),
        }
    }
}
