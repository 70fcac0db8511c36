//! # lucent-mongodb
//!
//! Document-store backend for Lucent.
//!
//! Compiled filters are plain BSON [`Document`](bson::Document)s ready to
//! pass to `find` or a `$match` stage:
//!
//! ```rust
//! use bson::doc;
//! use lucent_query::prelude::*;
//! use lucent_query::compiler::QueryCompiler;
//! use lucent_mongodb::MongoBackend;
//!
//! let declarations = FieldDeclarations::new()
//!     .field("author", FieldHandler::char().sources(["author.name"]));
//! let schema = Schema::new().field("views", SemanticType::Integer);
//! let registry = FieldRegistry::build(&declarations, &schema).unwrap();
//! let settings = Settings::default();
//! let backend = MongoBackend::new();
//!
//! let tree = Node::and([
//!     Node::condition("author", Operator::Eq, "ann"),
//!     Node::condition("views", Operator::Gt, "100"),
//! ]);
//! let filter = QueryCompiler::new(&backend, &registry, &settings).compile(&tree).unwrap();
//! assert_eq!(
//!     filter,
//!     doc! { "$and": [{ "author.name": "ann" }, { "views": { "$gt": 100i64 } }] }
//! );
//! ```
//!
//! Running aggregations is left to the caller: [`MongoIntrospector`] and
//! [`MongoValueSource`] take a callback that executes a pipeline against a
//! collection and returns the resulting documents.

pub mod backend;
pub mod error;
pub mod filter;
pub mod introspection;
pub mod suggest;
pub mod types;

pub use backend::{MongoBackend, wildcard_to_regex};
pub use error::{MongoError, MongoResult};
pub use filter::FilterBuilder;
pub use introspection::{MongoIntrospector, PipelineExecutor, infer_schema, sample_pipeline};
pub use suggest::{MongoValueSource, distinct_values_pipeline};
pub use types::{bson_to_text, filter_value_to_bson};
