//! Error types for the document-store backend.

use lucent_query::SearchError;
use thiserror::Error;

/// Result type for MongoDB backend operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors that can occur while building MongoDB filters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MongoError {
    /// A field path that cannot be used in a filter document.
    #[error("invalid field path `{0}`")]
    InvalidField(String),

    /// The pipeline executor failed.
    #[error("aggregation failed: {0}")]
    Executor(String),

    /// Sampling documents for schema inference failed.
    #[error("schema sampling failed: {0}")]
    Sampling(String),
}

impl MongoError {
    /// Create an executor error.
    pub fn executor(message: impl Into<String>) -> Self {
        Self::Executor(message.into())
    }
}

impl From<MongoError> for SearchError {
    fn from(err: MongoError) -> Self {
        match err {
            MongoError::Sampling(message) => SearchError::introspection(message),
            other => SearchError::backend("mongodb", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_query::ErrorCode;

    #[test]
    fn test_into_search_error() {
        let err: SearchError = MongoError::InvalidField("$where".into()).into();
        assert_eq!(err.code(), ErrorCode::Backend);
        assert!(err.to_string().contains("$where"));

        let err: SearchError = MongoError::Sampling("timeout".into()).into();
        assert_eq!(err.code(), ErrorCode::Introspection);
    }
}
