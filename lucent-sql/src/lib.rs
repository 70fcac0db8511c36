//! # lucent-sql
//!
//! Relational backend for Lucent.
//!
//! Compiled filters are [`Filter`] trees rendered to parameterized SQL for
//! PostgreSQL (`$1`), MySQL and SQLite (`?`):
//!
//! ```rust
//! use lucent_query::prelude::*;
//! use lucent_query::compiler::QueryCompiler;
//! use lucent_sql::SqlBackend;
//!
//! let declarations = FieldDeclarations::new()
//!     .field("name", FieldHandler::char().sources(["first_name", "last_name"]));
//! let schema = Schema::new().field("age", SemanticType::Integer);
//! let registry = FieldRegistry::build(&declarations, &schema).unwrap();
//! let settings = Settings::default();
//! let backend = SqlBackend::postgres();
//!
//! let tree = Node::and([
//!     Node::condition("name", Operator::Eq, "ann"),
//!     Node::condition("age", Operator::Gte, "18"),
//! ]);
//! let filter = QueryCompiler::new(&backend, &registry, &settings).compile(&tree).unwrap();
//! let (sql, params) = backend.to_sql(&filter);
//! assert_eq!(sql, "((first_name ILIKE $1 OR last_name ILIKE $2) AND age >= $3)");
//! assert_eq!(params.len(), 3);
//! ```
//!
//! Executing queries is left to the caller: [`SqlIntrospector`] and
//! [`SqlValueSource`] take a callback that runs a statement and returns
//! its rows.

pub mod backend;
pub mod error;
pub mod filter;
pub mod introspection;
pub mod sql;
pub mod suggest;

pub use backend::SqlBackend;
pub use error::{SqlError, SqlResult};
pub use filter::Filter;
pub use introspection::{ColumnInfo, SqlIntrospector, normalize_type, schema_from_columns};
pub use sql::{DatabaseType, SqlBuilder};
pub use suggest::{SqlValueSource, distinct_values_query};
