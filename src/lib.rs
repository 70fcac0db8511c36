//! # Lucent
//!
//! Lucene-style filter expressions compiled into backend predicates, with
//! cached value suggestions.
//!
//! Lucent provides:
//! - A field registry built from declarations and an introspected schema
//! - A compiler turning `field: value AND NOT other > 3` into backend predicates
//! - A prefix-keyed suggestion cache over a pluggable value source
//! - Relational (SQL) and document-store (BSON) backends
//!
//! ## Quick Start
//!
//! ```rust
//! use lucent::prelude::*;
//! use lucent::sql::SqlBackend;
//!
//! let set = lucent::search_set("Article", SqlBackend::postgres())
//!     .field("author", FieldHandler::char().sources(["author_first", "author_last"]))
//!     .schema(Schema::new().field("views", SemanticType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let filter = set.filter("author: ann AND views > 100").unwrap();
//! let (sql, params) = set.backend().to_sql(&filter);
//! assert_eq!(sql, "((author_first ILIKE $1 OR author_last ILIKE $2) AND views > $3)");
//! assert_eq!(params.len(), 3);
//!
//! // Lenient by default: a broken expression matches nothing.
//! let (sql, _) = set.backend().to_sql(&set.filter("views > lots").unwrap());
//! assert_eq!(sql, "FALSE");
//! ```
//!
//! ## Feature Flags
//!
//! - `sql` (default): the relational backend, re-exported as [`sql`]
//! - `mongodb`: the document-store backend, re-exported as `mongodb`
//! - `tracing-subscriber`: [`query::logging::init`] installs a subscriber

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod saved;

use lucent_query::{Backend, SearchSetBuilder};

/// Field registry, compiler and suggestion engine.
pub mod query {
    pub use lucent_query::*;
}

/// The reference expression parser.
pub mod parser {
    pub use lucent_parser::*;
}

/// Relational backend.
#[cfg(feature = "sql")]
#[cfg_attr(docsrs, doc(cfg(feature = "sql")))]
pub mod sql {
    pub use lucent_sql::*;
}

/// Document-store backend.
#[cfg(feature = "mongodb")]
#[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
pub mod mongodb {
    pub use lucent_mongodb::*;
}

pub use lucent_parser::{LuceneParser, parse};
pub use lucent_query::{Outcome, SearchError, SearchResult, SearchSet, Settings};
pub use saved::StoredExpressions;

/// Start a search set for `model` with the Lucene-style parser wired in.
pub fn search_set<B: Backend>(model: impl Into<String>, backend: B) -> SearchSetBuilder<B> {
    SearchSet::builder(model, backend).parser(LuceneParser::new())
}

/// Start a search set whose saved searches resolve through `saved` under
/// the pseudo-field `key`.
pub fn search_set_with_saved<B: Backend>(
    model: impl Into<String>,
    backend: B,
    key: impl Into<String>,
    saved: StoredExpressions,
) -> SearchSetBuilder<B> {
    search_set(model, backend)
        .settings(Settings::default().with_saved_searches(key))
        .saved_searches(saved)
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::StoredExpressions;
    pub use lucent_parser::LuceneParser;
    pub use lucent_query::prelude::*;
}
