//! Parse errors with source spans.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use lucent_query::SearchError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// A malformed filter expression.
#[derive(Error, Debug, Clone, Diagnostic)]
#[error("invalid filter expression: {message}")]
#[diagnostic(
    code(lucent::parser::syntax_error),
    help("expressions look like `field: value AND (other > 3 OR NOT flag: true)`")
)]
pub struct ParseError {
    #[source_code]
    pub src: String,
    #[label("error here")]
    pub span: miette::SourceSpan,
    pub message: String,
}

impl ParseError {
    /// Create a syntax error with source location.
    pub fn syntax(
        src: impl Into<String>,
        offset: usize,
        len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            span: (offset, len).into(),
            message: message.into(),
        }
    }

    /// Byte offset of the error in the source.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

impl From<ParseError> for SearchError {
    fn from(err: ParseError) -> Self {
        SearchError::parse(err.offset(), err.message)
    }
}
