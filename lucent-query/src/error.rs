//! Error types for filter compilation and suggestion retrieval.
//!
//! Every error carries an [`ErrorCode`] for programmatic handling.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: L{category}{number}
//! - 1xxx: Client input errors (parse, bad values)
//! - 2xxx: Compilation errors
//! - 3xxx: Declaration and schema errors
//! - 4xxx: Backend errors
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use lucent_query::{ErrorCode, SearchError};
//!
//! let err = SearchError::cast_value("age", "abc", "integer");
//! assert_eq!(err.code(), ErrorCode::CastValue);
//! assert!(err.is_bad_value());
//! assert_eq!(err.code().code(), "L1002");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed raw expression (L1001).
    Parse = 1001,
    /// A value could not be cast to the field's native type (L1002).
    CastValue = 1002,
    /// The AST could not be compiled (L2001).
    Compile = 2001,
    /// Invalid field declaration (L3001).
    Declaration = 3001,
    /// Schema introspection failed (L3002).
    Introspection = 3002,
    /// Backend rejected a lookup or failed to fetch values (L4001).
    Backend = 4001,
    /// Invalid configuration (L7001).
    Config = 7001,
    /// No expression parser configured (L7002).
    NoParser = 7002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "L1001").
    pub fn code(&self) -> String {
        format!("L{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Parse => "Malformed filter expression",
            Self::CastValue => "Bad filter value",
            Self::Compile => "Filter could not be compiled",
            Self::Declaration => "Invalid field declaration",
            Self::Introspection => "Schema introspection failed",
            Self::Backend => "Backend error",
            Self::Config => "Invalid configuration",
            Self::NoParser => "No expression parser configured",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur while building registries, compiling filters or
/// fetching suggestions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The raw expression is not valid filter syntax.
    #[error("parse error at offset {offset}: {message}")]
    Parse {
        /// Byte offset of the failure in the raw expression.
        offset: usize,
        /// Parser message.
        message: String,
    },

    /// A value could not be coerced into the field's native type.
    #[error("cannot cast `{value}` to {expected} for field `{field}`")]
    CastValue {
        /// Field (or source) the value was destined for.
        field: String,
        /// The raw value.
        value: String,
        /// Human readable target type.
        expected: &'static str,
    },

    /// The AST references nothing that can be compiled.
    #[error("compile error: {0}")]
    Compile(String),

    /// A field declaration is invalid.
    #[error("invalid field `{field}`: {message}")]
    Declaration {
        /// Declared field name.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Schema introspection failed.
    #[error("schema introspection failed: {0}")]
    Introspection(String),

    /// The backend rejected a lookup or failed to produce values.
    #[error("{backend} backend error: {message}")]
    Backend {
        /// Backend name.
        backend: &'static str,
        /// Backend message.
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// `filter` was called on a search set without a parser.
    #[error("no expression parser configured for `{0}`")]
    NoParser(String),
}

impl SearchError {
    /// Create a parse error.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Create a cast error.
    pub fn cast_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::CastValue {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    /// Create a declaration error.
    pub fn declaration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Declaration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an introspection error.
    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection(message.into())
    }

    /// Create a backend error.
    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } => ErrorCode::Parse,
            Self::CastValue { .. } => ErrorCode::CastValue,
            Self::Compile(_) => ErrorCode::Compile,
            Self::Declaration { .. } => ErrorCode::Declaration,
            Self::Introspection(_) => ErrorCode::Introspection,
            Self::Backend { .. } => ErrorCode::Backend,
            Self::Config(_) => ErrorCode::Config,
            Self::NoParser(_) => ErrorCode::NoParser,
        }
    }

    /// Check if this is a cast error.
    pub fn is_cast_error(&self) -> bool {
        matches!(self, Self::CastValue { .. })
    }

    /// Check if this error was caused by client-supplied input and should
    /// be reported as a bad filter rather than a server failure.
    pub fn is_bad_value(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::CastValue { .. })
    }
}

/// An alias declared by a field that matched nothing in the schema.
///
/// Never raised: the alias is left out of the registry and the warning is
/// kept on the registry for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedFieldWarning {
    /// The declared field owning the alias.
    pub field: String,
    /// The alias that could not be resolved.
    pub source: String,
}

impl fmt::Display for UnresolvedFieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source `{}` of field `{}` does not match any schema field",
            self.source, self.field
        )
    }
}
