//! # lucent-query
//!
//! Field registry, query compiler and suggestion engine for Lucent.
//!
//! This crate turns a boolean filter tree such as
//! `status: active AND (region: eu* OR priority > 3)` into a predicate for
//! an arbitrary backend, and offers autocomplete values per field:
//! - Typed field handlers with operator→lookup mapping, casting and wildcards
//! - A registry merging declared fields, aliases and introspected schemas
//! - AND/OR/NOT compilation with uniform NEQ negation
//! - Prefix-keyed, TTL-bound suggestion caching
//!
//! Parsing raw text and rendering predicates for a concrete store live in
//! the `lucent-parser`, `lucent-sql` and `lucent-mongodb` crates.
//!
//! ## Compiling a tree
//!
//! ```rust
//! use lucent_query::prelude::*;
//! use lucent_query::compiler::QueryCompiler;
//! # use lucent_query::SearchResult;
//! # #[derive(Debug, Clone, PartialEq)]
//! # struct S(String);
//! # struct Text;
//! # impl Backend for Text {
//! #     type Predicate = S;
//! #     fn name(&self) -> &'static str { "text" }
//! #     fn lookup(&self, s: &str, l: Lookup, v: &FilterValue) -> SearchResult<S> { Ok(S(format!("{}__{}={}", s, l, v))) }
//! #     fn and(&self, p: Vec<S>) -> S { S(format!("({})", p.iter().map(|s| s.0.as_str()).collect::<Vec<_>>().join(" & "))) }
//! #     fn or(&self, p: Vec<S>) -> S { S(format!("({})", p.iter().map(|s| s.0.as_str()).collect::<Vec<_>>().join(" | "))) }
//! #     fn not(&self, p: S) -> S { S(format!("~{}", p.0)) }
//! #     fn match_all(&self) -> S { S("ALL".into()) }
//! #     fn match_none(&self) -> S { S("NONE".into()) }
//! # }
//!
//! let declarations = FieldDeclarations::new().field("char_field", FieldHandler::char());
//! let schema = Schema::new().field("integer_field", SemanticType::Integer);
//! let registry = FieldRegistry::build(&declarations, &schema).unwrap();
//! let settings = Settings::default();
//!
//! let tree = Node::and([
//!     Node::condition("char_field", Operator::Eq, "foo"),
//!     Node::condition("integer_field", Operator::Eq, "5"),
//! ]);
//! let predicate = QueryCompiler::new(&Text, &registry, &settings).compile(&tree).unwrap();
//! assert_eq!(predicate.0, "(char_field__icontains=foo & integer_field__exact=5)");
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`SearchError`] carrying an [`ErrorCode`]; parse and
//! cast errors are client errors (`is_bad_value()`).

pub mod ast;
pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod field;
pub mod logging;
pub mod lookup;
pub mod registry;
pub mod schema;
pub mod searchset;
pub mod suggest;
pub mod value;

pub use ast::{Condition, Node, Operator};
pub use backend::{Backend, NoValues, ValueSource};
pub use compiler::{MAX_SAVED_SEARCH_DEPTH, QueryCompiler, SavedSearches};
pub use config::Settings;
pub use error::{ErrorCode, SearchError, SearchResult, UnresolvedFieldWarning};
pub use field::{DEFAULT_SEARCH_FIELD, FieldHandler, FieldKind, MATCH_ALL_VALUE};
pub use lookup::{Lookup, LookupTable};
pub use registry::{FieldDeclarations, FieldRegistry, RegistryCell};
pub use schema::{Schema, SchemaSource, SemanticType};
pub use searchset::{ExpressionParser, Outcome, SearchSet, SearchSetBuilder};
pub use suggest::{
    CacheStats, CacheStore, MemoryStore, SuggestOptions, SuggestionCache, SuggestionKey,
};
pub use value::FilterValue;

#[doc(hidden)]
pub use tracing;

/// Commonly used types.
pub mod prelude {
    pub use crate::ast::{Condition, Node, Operator};
    pub use crate::backend::{Backend, ValueSource};
    pub use crate::config::Settings;
    pub use crate::error::{SearchError, SearchResult};
    pub use crate::field::{FieldHandler, FieldKind};
    pub use crate::lookup::Lookup;
    pub use crate::registry::{FieldDeclarations, FieldRegistry};
    pub use crate::schema::{Schema, SchemaSource, SemanticType};
    pub use crate::searchset::{ExpressionParser, Outcome, SearchSet};
    pub use crate::suggest::SuggestOptions;
    pub use crate::value::FilterValue;
}
