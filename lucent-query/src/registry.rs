//! Field registry.
//!
//! The registry maps every name a query may use (declared fields, their
//! aliases and introspected schema fields) to a [`FieldHandler`].
//!
//! Resolution precedence, highest first:
//!
//! 1. a declared field with that exact name
//! 2. an alias registered through a declared field's sources
//! 3. a handler synthesized from the schema type
//! 4. the default handler
//!
//! ```rust
//! use lucent_query::field::{FieldHandler, FieldKind};
//! use lucent_query::registry::{FieldDeclarations, FieldRegistry};
//! use lucent_query::schema::{Schema, SemanticType};
//!
//! let declarations = FieldDeclarations::new()
//!     .field("name", FieldHandler::char().sources(["first_name", "last_name"]));
//! let schema = Schema::new()
//!     .field("first_name", SemanticType::String)
//!     .field("age", SemanticType::Integer);
//!
//! let registry = FieldRegistry::build(&declarations, &schema).unwrap();
//! assert_eq!(registry.resolve("age").kind(), FieldKind::Integer);
//! assert_eq!(registry.resolve("last_name").kind(), FieldKind::Char);
//! assert_eq!(registry.resolve("nope").kind(), FieldKind::Generic);
//! assert_eq!(registry.fields(), vec!["name", "first_name", "last_name", "age"]);
//! ```

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{SearchError, SearchResult, UnresolvedFieldWarning};
use crate::field::{DEFAULT_SEARCH_FIELD, FieldHandler, FieldKind};
use crate::schema::Schema;

/// User-declared fields and exclusion lists.
#[derive(Debug, Clone, Default)]
pub struct FieldDeclarations {
    fields: IndexMap<String, FieldHandler>,
    exclude_from_mapping: IndexSet<String>,
    exclude_from_suggestions: IndexSet<String>,
}

impl FieldDeclarations {
    /// Create an empty declaration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. A later declaration of the same name replaces it.
    pub fn field(mut self, name: impl Into<String>, handler: FieldHandler) -> Self {
        self.fields.insert(name.into(), handler);
        self
    }

    /// Names never listed in the mapping.
    pub fn exclude_from_mapping<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_mapping
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Names that never get suggestions.
    pub fn exclude_from_suggestions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_suggestions
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Merge another set into this one; `other` wins on name clashes.
    pub fn extend(mut self, other: FieldDeclarations) -> Self {
        for (name, handler) in other.fields {
            self.fields.insert(name, handler);
        }
        self.exclude_from_mapping.extend(other.exclude_from_mapping);
        self.exclude_from_suggestions
            .extend(other.exclude_from_suggestions);
        self
    }

    /// Merge an ordered list of sets, later sets winning.
    pub fn merged(sets: impl IntoIterator<Item = FieldDeclarations>) -> Self {
        sets.into_iter().fold(Self::new(), Self::extend)
    }

    /// A declared handler.
    pub fn get(&self, name: &str) -> Option<&FieldHandler> {
        self.fields.get(name)
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject declarations that are invalid regardless of the schema.
    pub fn validate(&self) -> SearchResult<()> {
        for (name, handler) in &self.fields {
            let sources = handler.declared_sources();
            if sources.len() == 1 && sources.contains(name.as_str()) {
                return Err(SearchError::declaration(
                    name.as_str(),
                    "a field cannot use itself as its only source",
                ));
            }
        }
        Ok(())
    }
}

/// Resolved name→handler mapping for one backend schema.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    declared: IndexMap<String, Arc<FieldHandler>>,
    by_source: IndexMap<String, Arc<FieldHandler>>,
    aliases: IndexSet<String>,
    schema_fields: IndexSet<String>,
    exclude_from_mapping: IndexSet<String>,
    exclude_from_suggestions: IndexSet<String>,
    missing: Vec<UnresolvedFieldWarning>,
    default_handler: Arc<FieldHandler>,
}

impl FieldRegistry {
    /// Build the registry from declarations and an introspected schema.
    pub fn build(declarations: &FieldDeclarations, schema: &Schema) -> SearchResult<Self> {
        declarations.validate()?;

        let mut by_source = IndexMap::new();
        let mut schema_fields = IndexSet::new();
        for (name, ty) in schema.fields() {
            let handler = FieldHandler::new(FieldKind::from_semantic(ty)).source(name);
            by_source.insert(name.to_string(), Arc::new(handler));
            schema_fields.insert(name.to_string());
        }

        let mut aliases = IndexSet::new();
        let mut missing = Vec::new();
        for (name, handler) in &declarations.fields {
            if handler.excludes_sources_from_mapping() {
                continue;
            }
            for source in handler.declared_sources() {
                if handler.uses_field_class_for_sources() {
                    by_source.insert(source.clone(), Arc::new(handler.for_alias(source)));
                    aliases.insert(source.clone());
                } else if !schema.contains(source) {
                    let warning = UnresolvedFieldWarning {
                        field: name.clone(),
                        source: source.clone(),
                    };
                    warn!(field = %name, source = %source, "{}", warning);
                    missing.push(warning);
                }
            }
        }

        let declared: IndexMap<_, _> = declarations
            .fields
            .iter()
            .map(|(name, handler)| (name.clone(), Arc::new(handler.clone())))
            .collect();

        let search_fields: Vec<&str> = schema.search_fields().collect();
        if !search_fields.is_empty() && !declared.contains_key(DEFAULT_SEARCH_FIELD) {
            by_source.insert(
                DEFAULT_SEARCH_FIELD.to_string(),
                Arc::new(FieldHandler::full_text().sources(search_fields)),
            );
        }

        let mut exclude_from_mapping = declarations.exclude_from_mapping.clone();
        let mut exclude_from_suggestions = declarations.exclude_from_suggestions.clone();
        for (name, handler) in &declarations.fields {
            if handler.excludes_sources_from_mapping() {
                exclude_from_mapping.extend(handler.declared_sources().iter().cloned());
            }
            if !handler.shows_suggestions() {
                exclude_from_suggestions.insert(name.clone());
            }
        }

        info!(
            declared = declared.len(),
            sources = by_source.len(),
            missing = missing.len(),
            "FieldRegistry built"
        );

        Ok(Self {
            declared,
            by_source,
            aliases,
            schema_fields,
            exclude_from_mapping,
            exclude_from_suggestions,
            missing,
            default_handler: Arc::new(FieldHandler::generic()),
        })
    }

    /// Resolve a field name. Unknown names get the default handler.
    pub fn resolve(&self, name: &str) -> Arc<FieldHandler> {
        self.declared
            .get(name)
            .or_else(|| self.by_source.get(name))
            .cloned()
            .unwrap_or_else(|| self.default_handler.clone())
    }

    /// Check if a name resolves to something other than the default handler.
    pub fn is_known(&self, name: &str) -> bool {
        self.declared.contains_key(name) || self.by_source.contains_key(name)
    }

    /// The handler to use for suggestions, or `None` when the field is
    /// unknown or excluded.
    pub fn suggestion_handler(&self, name: &str) -> Option<Arc<FieldHandler>> {
        if self.exclude_from_mapping.contains(name) || self.exclude_from_suggestions.contains(name)
        {
            return None;
        }
        self.declared
            .get(name)
            .or_else(|| self.by_source.get(name))
            .cloned()
    }

    /// Queryable names: declared fields, then aliases, then schema fields,
    /// without mapping exclusions.
    pub fn fields(&self) -> Vec<&str> {
        let mut seen = IndexSet::new();
        for name in self
            .declared
            .keys()
            .chain(self.aliases.iter())
            .chain(self.schema_fields.iter())
        {
            if !self.exclude_from_mapping.contains(name) {
                seen.insert(name.as_str());
            }
        }
        seen.into_iter().collect()
    }

    /// Queryable names with whether each one offers suggestions.
    pub fn fields_with_suggestions(&self) -> IndexMap<String, bool> {
        self.fields()
            .into_iter()
            .map(|name| (name.to_string(), self.suggestion_handler(name).is_some_and(|h| h.shows_suggestions())))
            .collect()
    }

    /// Every source declared by a declared field.
    pub fn declared_sources(&self) -> Vec<&str> {
        self.declared
            .values()
            .flat_map(|handler| handler.declared_sources().iter().map(String::as_str))
            .collect()
    }

    /// Names registered through aliases, the schema or the default search field.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.by_source.keys().map(String::as_str)
    }

    /// Declared field names.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.declared.keys().map(String::as_str)
    }

    /// The mapping exclusion set.
    pub fn excluded_from_mapping(&self) -> &IndexSet<String> {
        &self.exclude_from_mapping
    }

    /// The suggestion exclusion set.
    pub fn excluded_from_suggestions(&self) -> &IndexSet<String> {
        &self.exclude_from_suggestions
    }

    /// Aliases that matched nothing in the schema.
    pub fn missing_sources(&self) -> &[UnresolvedFieldWarning] {
        &self.missing
    }

    /// Check if a default search field is registered.
    pub fn has_default_search_field(&self) -> bool {
        self.is_known(DEFAULT_SEARCH_FIELD)
    }
}

/// Memoized registry slot.
///
/// Concurrent first use may build more than once; the first published
/// registry wins and later builds are dropped.
#[derive(Debug, Default)]
pub struct RegistryCell {
    slot: RwLock<Option<Arc<FieldRegistry>>>,
}

impl RegistryCell {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized registry, building it with `build` on first use.
    pub fn get_or_try_init<F>(&self, build: F) -> SearchResult<Arc<FieldRegistry>>
    where
        F: FnOnce() -> SearchResult<FieldRegistry>,
    {
        if let Some(registry) = self.slot.read().as_ref() {
            return Ok(registry.clone());
        }
        let built = Arc::new(build()?);
        let mut slot = self.slot.write();
        Ok(slot.get_or_insert(built).clone())
    }

    /// The registry, if already built.
    pub fn get(&self) -> Option<Arc<FieldRegistry>> {
        self.slot.read().clone()
    }

    /// Drop the memoized registry so the next use rebuilds it.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}
