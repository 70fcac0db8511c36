//! [`Backend`] implementation producing BSON filter documents.

use bson::{Bson, Document};
use lucent_query::{Backend, FieldKind, FilterValue, Lookup, LookupTable, Operator, SearchResult};

use crate::error::MongoError;
use crate::filter::{self, FilterBuilder};
use crate::types::filter_value_to_bson;

/// Document-store backend.
///
/// Text fields compare as exact terms by default; prefix, suffix and
/// substring lookups become anchored regular expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MongoBackend {
    text_index: bool,
}

impl MongoBackend {
    /// Create a backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route full-text conditions to the collection's `$text` index
    /// instead of per-field regular expressions.
    ///
    /// MongoDB only accepts `$text` at the top level or under `$and`. A
    /// bare term that ends up negated (`$nor`) or in an `$or` with
    /// unindexed clauses is rejected by the server, so leave this off when
    /// users may write `NOT term` or `a OR term`.
    pub fn with_text_index(mut self, enabled: bool) -> Self {
        self.text_index = enabled;
        self
    }
}

fn validate_field(source: &str) -> Result<(), MongoError> {
    if source.is_empty() || source.starts_with('$') || source.split('.').any(str::is_empty) {
        return Err(MongoError::InvalidField(source.to_string()));
    }
    Ok(())
}

/// Turn a `*` wildcard pattern into an anchored regex. `\*` stays a
/// literal star.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'*') => {
                chars.next();
                literal.push('*');
            }
            '*' => {
                out.push_str(&regex_lite::escape(&literal));
                literal.clear();
                out.push_str(".*");
            }
            c => literal.push(c),
        }
    }
    out.push_str(&regex_lite::escape(&literal));
    out.push('$');
    out
}

fn regex(source: &str, pattern: String, case_insensitive: bool) -> Document {
    FilterBuilder::new()
        .regex(source, &pattern, if case_insensitive { "i" } else { "" })
        .build()
}

impl Backend for MongoBackend {
    type Predicate = Document;

    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn lookups(&self, kind: FieldKind) -> LookupTable {
        match kind {
            FieldKind::Generic | FieldKind::Char => LookupTable::new(Lookup::Exact)
                .with(Operator::Eq, Lookup::Exact)
                .with(Operator::Neq, Lookup::Exact)
                .with(Operator::Match, Lookup::Regex)
                .with_ranges(),
            other => other.default_lookups(),
        }
    }

    fn lookup(&self, source: &str, lookup: Lookup, value: &FilterValue) -> SearchResult<Document> {
        validate_field(source)?;
        let escaped = || regex_lite::escape(&value.to_string());
        let bson = filter_value_to_bson(value);
        Ok(match lookup {
            Lookup::Exact => FilterBuilder::new().eq(source, bson).build(),
            Lookup::IExact => match bson {
                Bson::String(_) => regex(source, format!("^{}$", escaped()), true),
                other => FilterBuilder::new().eq(source, other).build(),
            },
            Lookup::Contains => regex(source, escaped(), false),
            Lookup::IContains => regex(source, escaped(), true),
            Lookup::StartsWith => regex(source, format!("^{}", escaped()), false),
            Lookup::IStartsWith => regex(source, format!("^{}", escaped()), true),
            Lookup::EndsWith => regex(source, format!("{}$", escaped()), false),
            Lookup::IEndsWith => regex(source, format!("{}$", escaped()), true),
            Lookup::Gt => FilterBuilder::new().gt(source, bson).build(),
            Lookup::Gte => FilterBuilder::new().gte(source, bson).build(),
            Lookup::Lt => FilterBuilder::new().lt(source, bson).build(),
            Lookup::Lte => FilterBuilder::new().lte(source, bson).build(),
            Lookup::Wildcard => regex(source, wildcard_to_regex(&value.to_string()), true),
            Lookup::Regex => regex(source, value.to_string(), true),
        })
    }

    fn full_text(&self, sources: &[String], text: &str) -> SearchResult<Document> {
        for source in sources {
            validate_field(source)?;
        }
        if self.text_index {
            return Ok(FilterBuilder::new().text_search(text).build());
        }
        let pattern = regex_lite::escape(text);
        Ok(filter::or(
            sources
                .iter()
                .map(|source| regex(source, pattern.clone(), true))
                .collect(),
        ))
    }

    fn and(&self, predicates: Vec<Document>) -> Document {
        filter::and(predicates)
    }

    fn or(&self, predicates: Vec<Document>) -> Document {
        filter::or(predicates)
    }

    fn not(&self, predicate: Document) -> Document {
        filter::not(predicate)
    }

    fn match_all(&self) -> Document {
        filter::all()
    }

    fn match_none(&self) -> Document {
        filter::nothing()
    }
}
