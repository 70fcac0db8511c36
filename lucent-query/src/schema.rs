//! Backend schema introspection contract.
//!
//! A backend describes its filterable fields as a map from field name to
//! [`SemanticType`] (or `None` when the native type is unknown). The
//! registry synthesizes a typed handler for every known type.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;

/// Semantic type of a native backend field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// `true`/`false`.
    Boolean,
    /// `true`/`false`/`null`.
    NullableBoolean,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Text.
    String,
    /// Dates and date-times.
    Timestamp,
}

/// Introspected schema of one model, collection or index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: IndexMap<String, Option<SemanticType>>,
    default_search_fields: IndexSet<String>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with a known semantic type.
    pub fn field(mut self, name: impl Into<String>, ty: SemanticType) -> Self {
        self.fields.insert(name.into(), Some(ty));
        self
    }

    /// Add a field whose native type has no semantic mapping.
    pub fn unknown_field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    /// Add a field with an optional semantic type.
    pub fn insert(&mut self, name: impl Into<String>, ty: Option<SemanticType>) {
        self.fields.insert(name.into(), ty);
    }

    /// Declare the fields used for unscoped free-text search.
    pub fn default_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Iterate over fields in introspection order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<SemanticType>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check if the schema knows a field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Semantic type of a field, if the field exists and its type is known.
    pub fn semantic_type(&self, name: &str) -> Option<SemanticType> {
        self.fields.get(name).copied().flatten()
    }

    /// The free-text search fields.
    pub fn search_fields(&self) -> impl Iterator<Item = &str> {
        self.default_search_fields.iter().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Something that can enumerate a backend's fields.
///
/// Called once per registry build; implementations may block.
pub trait SchemaSource: Send + Sync {
    /// Introspect the backend.
    fn introspect(&self) -> SearchResult<Schema>;
}

impl SchemaSource for Schema {
    fn introspect(&self) -> SearchResult<Schema> {
        Ok(self.clone())
    }
}

impl<F> SchemaSource for F
where
    F: Fn() -> SearchResult<Schema> + Send + Sync,
{
    fn introspect(&self) -> SearchResult<Schema> {
        self()
    }
}
