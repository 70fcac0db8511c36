//! Typed field handlers.
//!
//! A [`FieldHandler`] owns everything the compiler needs to turn one
//! condition into a backend predicate: which lookup an operator maps to,
//! how the raw value is cast, which sources (aliases) it fans out to and
//! whether it offers value suggestions.
//!
//! ```rust
//! use lucent_query::ast::Operator;
//! use lucent_query::field::{FieldHandler, FieldKind};
//! use lucent_query::lookup::Lookup;
//!
//! let handler = FieldHandler::char()
//!     .sources(["first_name", "last_name"])
//!     .lookup_for(Operator::Eq, Lookup::IStartsWith)
//!     .hide_suggestions();
//!
//! assert_eq!(handler.kind(), FieldKind::Char);
//! assert_eq!(handler.get_sources("name"), vec!["first_name", "last_name"]);
//! assert!(!handler.shows_suggestions());
//! ```

mod cast;
pub mod wildcard;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::Operator;
use crate::backend::Backend;
use crate::error::SearchResult;
use crate::lookup::{Lookup, LookupTable};
use crate::schema::SemanticType;
use crate::value::FilterValue;
use wildcard::Pattern;

/// Reserved pseudo-field used for unscoped free-text terms.
pub const DEFAULT_SEARCH_FIELD: &str = "_default";

/// Value meaning "no constraint".
pub const MATCH_ALL_VALUE: &str = "*";

/// Static value provider for suggestions.
pub type ValueProvider = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Kind of a field handler; decides casting, wildcard handling and the
/// default lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Untyped text with wildcard support. Used for unknown fields.
    #[default]
    Generic,
    /// Text where equality means substring match.
    Char,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Float,
    /// `true`/`false`.
    Boolean,
    /// `true`/`false`/`null`.
    NullBoolean,
    /// Dates and date-times.
    Timestamp,
    /// Free-text search over several sources.
    FullText,
}

impl FieldKind {
    /// Handler kind for a schema type; unknown types use the default kind.
    pub fn from_semantic(ty: Option<SemanticType>) -> Self {
        match ty {
            Some(SemanticType::Boolean) => Self::Boolean,
            Some(SemanticType::NullableBoolean) => Self::NullBoolean,
            Some(SemanticType::Integer) => Self::Integer,
            Some(SemanticType::Float) => Self::Float,
            Some(SemanticType::String) => Self::Char,
            Some(SemanticType::Timestamp) => Self::Timestamp,
            None => Self::Generic,
        }
    }

    /// Kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Char => "char",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::NullBoolean => "null_boolean",
            Self::Timestamp => "timestamp",
            Self::FullText => "full_text",
        }
    }

    /// Relational-style lookup table for this kind.
    pub fn default_lookups(&self) -> LookupTable {
        match self {
            Self::Generic => LookupTable::new(Lookup::IExact).with(Operator::Match, Lookup::Regex),
            Self::Char => LookupTable::new(Lookup::IExact)
                .with(Operator::Eq, Lookup::IContains)
                .with(Operator::Neq, Lookup::IExact)
                .with(Operator::Match, Lookup::Regex),
            Self::Integer | Self::Float | Self::Timestamp => LookupTable::new(Lookup::Exact)
                .with(Operator::Eq, Lookup::Exact)
                .with(Operator::Neq, Lookup::Exact)
                .with_ranges(),
            Self::Boolean | Self::NullBoolean => LookupTable::new(Lookup::Exact),
            Self::FullText => LookupTable::new(Lookup::IContains),
        }
    }

    /// Check if values of this kind are scanned for wildcards.
    pub fn supports_wildcards(&self) -> bool {
        matches!(self, Self::Generic | Self::Char)
    }

    /// Values offered as suggestions when no provider is configured.
    pub fn default_values(&self) -> &'static [&'static str] {
        match self {
            Self::Boolean => &["true", "false"],
            Self::NullBoolean => &["true", "false", "null"],
            _ => &[],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed unit of filtering behavior for one logical field.
///
/// Handlers are immutable once registered and shared behind an [`Arc`].
#[derive(Clone)]
pub struct FieldHandler {
    kind: FieldKind,
    sources: IndexSet<String>,
    default_lookup: Option<Lookup>,
    operator_to_lookup: HashMap<Operator, Lookup>,
    exclude_sources_from_mapping: bool,
    show_suggestions: bool,
    use_cache_for_suggestions: Option<bool>,
    use_field_class_for_sources: bool,
    case_sensitive_wildcard: bool,
    value_provider: Option<ValueProvider>,
}

impl FieldHandler {
    /// Create a handler of the given kind.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            sources: IndexSet::new(),
            default_lookup: None,
            operator_to_lookup: HashMap::new(),
            exclude_sources_from_mapping: false,
            show_suggestions: true,
            use_cache_for_suggestions: None,
            use_field_class_for_sources: true,
            case_sensitive_wildcard: false,
            value_provider: None,
        }
    }

    /// Generic text handler.
    pub fn generic() -> Self {
        Self::new(FieldKind::Generic)
    }

    /// Substring-matching text handler.
    pub fn char() -> Self {
        Self::new(FieldKind::Char)
    }

    /// Integer handler.
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// Float handler.
    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    /// Boolean handler.
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Nullable boolean handler.
    pub fn null_boolean() -> Self {
        Self::new(FieldKind::NullBoolean)
    }

    /// Timestamp handler.
    pub fn timestamp() -> Self {
        Self::new(FieldKind::Timestamp)
    }

    /// Free-text handler.
    pub fn full_text() -> Self {
        Self::new(FieldKind::FullText)
    }

    // ========================================================================
    // Builder options
    // ========================================================================

    /// Set the sources (aliases). Duplicates are dropped, order is kept.
    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Add a single source.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.sources.insert(source.into());
        self
    }

    /// Override the fallback lookup.
    pub fn default_lookup(mut self, lookup: Lookup) -> Self {
        self.default_lookup = Some(lookup);
        self
    }

    /// Override the lookup used for one operator.
    pub fn lookup_for(mut self, operator: Operator, lookup: Lookup) -> Self {
        self.operator_to_lookup.insert(operator, lookup);
        self
    }

    /// Keep the sources out of the field mapping.
    pub fn exclude_sources_from_mapping(mut self) -> Self {
        self.exclude_sources_from_mapping = true;
        self
    }

    /// Disable value suggestions.
    pub fn hide_suggestions(mut self) -> Self {
        self.show_suggestions = false;
        self
    }

    /// Enable or disable value suggestions.
    pub fn show_suggestions(mut self, show: bool) -> Self {
        self.show_suggestions = show;
        self
    }

    /// Force suggestion caching on or off. Unset follows the settings.
    pub fn use_cache_for_suggestions(mut self, use_cache: bool) -> Self {
        self.use_cache_for_suggestions = Some(use_cache);
        self
    }

    /// Whether aliases get a handler instance of this kind.
    ///
    /// When disabled, aliases resolve through the schema instead, and an
    /// alias missing from the schema is reported as unresolved.
    pub fn use_field_class_for_sources(mut self, enabled: bool) -> Self {
        self.use_field_class_for_sources = enabled;
        self
    }

    /// Use case-sensitive prefix/suffix/substring lookups for wildcards.
    pub fn case_sensitive_wildcard(mut self, enabled: bool) -> Self {
        self.case_sensitive_wildcard = enabled;
        self
    }

    /// Use a static list of suggestion values.
    pub fn value_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        self.value_provider = Some(Arc::new(provider));
        self
    }

    /// A handler of the same kind and options scoped to a single alias.
    pub fn for_alias(&self, alias: &str) -> Self {
        let mut handler = self.clone();
        handler.sources = IndexSet::from([alias.to_string()]);
        handler
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Handler kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Declared sources.
    pub fn declared_sources(&self) -> &IndexSet<String> {
        &self.sources
    }

    /// Sources to query for `field_name`: the declared sources, or the
    /// name itself when none are declared.
    pub fn get_sources(&self, field_name: &str) -> Vec<String> {
        if self.sources.is_empty() {
            vec![field_name.to_string()]
        } else {
            self.sources.iter().cloned().collect()
        }
    }

    /// Check if the sources are kept out of the mapping.
    pub fn excludes_sources_from_mapping(&self) -> bool {
        self.exclude_sources_from_mapping
    }

    /// Check if value suggestions are offered.
    pub fn shows_suggestions(&self) -> bool {
        self.show_suggestions
    }

    /// Whether suggestions are cached, given the global default.
    pub fn uses_cache(&self, global_default: bool) -> bool {
        self.use_cache_for_suggestions.unwrap_or(global_default)
    }

    /// Check if aliases get handler instances of this kind.
    pub fn uses_field_class_for_sources(&self) -> bool {
        self.use_field_class_for_sources
    }

    /// Static suggestion values: the configured provider, else the kind's
    /// built-in values. `None` means values come from the backend.
    pub fn static_values(&self) -> Option<Vec<String>> {
        if let Some(provider) = &self.value_provider {
            return Some(provider());
        }
        let defaults = self.kind.default_values();
        if defaults.is_empty() {
            None
        } else {
            Some(defaults.iter().map(|v| v.to_string()).collect())
        }
    }

    /// Resolve the lookup for `operator`.
    ///
    /// Order: handler override, backend table mapping, handler default,
    /// backend table default.
    pub fn get_lookup(&self, operator: Operator, table: &LookupTable) -> Lookup {
        self.operator_to_lookup
            .get(&operator)
            .copied()
            .or_else(|| table.explicit(operator))
            .or(self.default_lookup)
            .unwrap_or_else(|| table.default_lookup())
    }

    /// Check if `value` means "no constraint".
    pub fn match_all(&self, value: &str) -> bool {
        value == MATCH_ALL_VALUE
    }

    // ========================================================================
    // Predicate construction
    // ========================================================================

    /// Build the predicate for one condition, without NEQ negation.
    ///
    /// Returns `Ok(None)` when the condition puts no constraint on the
    /// result (a bare `*` or a wildcard that strips to nothing).
    pub fn build<B: Backend>(
        &self,
        backend: &B,
        name: &str,
        operator: Operator,
        raw: &str,
    ) -> SearchResult<Option<B::Predicate>> {
        if self.match_all(raw) {
            return Ok(None);
        }

        let sources = self.get_sources(name);

        if self.kind == FieldKind::FullText {
            return backend.full_text(&sources, raw).map(Some);
        }

        let mut lookup = self.get_lookup(operator, &backend.lookups(self.kind));
        let value = if self.kind.supports_wildcards() && lookup != Lookup::Regex {
            let pattern = Pattern::parse(raw);
            match pattern.lookup(self.case_sensitive_wildcard) {
                Some(wildcard_lookup) => {
                    let value = pattern.into_value();
                    if value.is_empty() {
                        return Ok(None);
                    }
                    lookup = wildcard_lookup;
                    FilterValue::String(value)
                }
                None => FilterValue::String(pattern.into_value()),
            }
        } else {
            self.kind.cast(name, raw)?
        };

        debug!(
            field = name,
            kind = %self.kind,
            lookup = %lookup,
            sources = sources.len(),
            "FieldHandler::build()"
        );

        let predicates = sources
            .iter()
            .map(|source| backend.lookup(source, lookup, &value))
            .collect::<SearchResult<Vec<_>>>()?;
        Ok(Some(backend.or(predicates)))
    }
}

impl fmt::Debug for FieldHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHandler")
            .field("kind", &self.kind)
            .field("sources", &self.sources)
            .field("default_lookup", &self.default_lookup)
            .field("operator_to_lookup", &self.operator_to_lookup)
            .field("exclude_sources_from_mapping", &self.exclude_sources_from_mapping)
            .field("show_suggestions", &self.show_suggestions)
            .field("use_cache_for_suggestions", &self.use_cache_for_suggestions)
            .field("use_field_class_for_sources", &self.use_field_class_for_sources)
            .field("case_sensitive_wildcard", &self.case_sensitive_wildcard)
            .field("value_provider", &self.value_provider.is_some())
            .finish()
    }
}

impl Default for FieldHandler {
    fn default() -> Self {
        Self::generic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Pred, TreeBackend};
    use pretty_assertions::assert_eq;

    fn build(handler: &FieldHandler, name: &str, op: Operator, raw: &str) -> Option<Pred> {
        handler.build(&TreeBackend, name, op, raw).unwrap()
    }

    #[test]
    fn test_char_eq_is_substring() {
        let pred = build(&FieldHandler::char(), "name", Operator::Eq, "foo");
        assert_eq!(pred, Some(Pred::lookup("name", Lookup::IContains, "foo")));
    }

    #[test]
    fn test_char_neq_uses_iexact_without_negation() {
        let pred = build(&FieldHandler::char(), "name", Operator::Neq, "foo");
        assert_eq!(pred, Some(Pred::lookup("name", Lookup::IExact, "foo")));
    }

    #[test]
    fn test_integer_cast_and_ranges() {
        let handler = FieldHandler::integer();
        assert_eq!(
            build(&handler, "age", Operator::Eq, "5"),
            Some(Pred::lookup("age", Lookup::Exact, 5i64))
        );
        assert_eq!(
            build(&handler, "age", Operator::Gte, "18"),
            Some(Pred::lookup("age", Lookup::Gte, 18i64))
        );
        let err = handler.build(&TreeBackend, "age", Operator::Eq, "x").unwrap_err();
        assert!(err.is_cast_error());
    }

    #[test]
    fn test_match_all_value() {
        assert_eq!(build(&FieldHandler::integer(), "age", Operator::Eq, "*"), None);
        assert_eq!(build(&FieldHandler::char(), "name", Operator::Eq, "**"), None);
    }

    #[test]
    fn test_wildcards() {
        let handler = FieldHandler::generic();
        assert_eq!(
            build(&handler, "name", Operator::Eq, "ab*"),
            Some(Pred::lookup("name", Lookup::IStartsWith, "ab"))
        );
        assert_eq!(
            build(&handler, "name", Operator::Eq, "*ab"),
            Some(Pred::lookup("name", Lookup::IEndsWith, "ab"))
        );
        assert_eq!(
            build(&handler, "name", Operator::Eq, "a*b"),
            Some(Pred::lookup("name", Lookup::Wildcard, "a*b"))
        );
        let sensitive = FieldHandler::generic().case_sensitive_wildcard(true);
        assert_eq!(
            build(&sensitive, "name", Operator::Eq, "*ab*"),
            Some(Pred::lookup("name", Lookup::Contains, "ab"))
        );
    }

    #[test]
    fn test_numbers_ignore_wildcards() {
        let err = FieldHandler::integer()
            .build(&TreeBackend, "age", Operator::Eq, "1*")
            .unwrap_err();
        assert!(err.is_cast_error());
    }

    #[test]
    fn test_regex_is_not_wildcard_scanned() {
        assert_eq!(
            build(&FieldHandler::char(), "name", Operator::Match, "^a.*"),
            Some(Pred::lookup("name", Lookup::Regex, "^a.*"))
        );
    }

    #[test]
    fn test_sources_fan_out_as_disjunction() {
        let handler = FieldHandler::char().sources(["a", "b", "a"]);
        assert_eq!(
            build(&handler, "x", Operator::Eq, "v"),
            Some(Pred::Or(vec![
                Pred::lookup("a", Lookup::IContains, "v"),
                Pred::lookup("b", Lookup::IContains, "v"),
            ]))
        );
    }

    #[test]
    fn test_lookup_precedence() {
        let table = FieldKind::Char.default_lookups();
        let handler = FieldHandler::char()
            .default_lookup(Lookup::Exact)
            .lookup_for(Operator::Eq, Lookup::IStartsWith);
        assert_eq!(handler.get_lookup(Operator::Eq, &table), Lookup::IStartsWith);
        // table mapping beats the handler default
        assert_eq!(handler.get_lookup(Operator::Neq, &table), Lookup::IExact);
        assert_eq!(handler.get_lookup(Operator::Gt, &table), Lookup::Exact);
        assert_eq!(FieldHandler::char().get_lookup(Operator::Gt, &table), Lookup::IExact);
    }

    #[test]
    fn test_null_boolean_null_token() {
        assert_eq!(
            build(&FieldHandler::null_boolean(), "flag", Operator::Eq, "null"),
            Some(Pred::lookup("flag", Lookup::Exact, FilterValue::Null))
        );
    }

    #[test]
    fn test_full_text_uses_backend_search() {
        let handler = FieldHandler::full_text().sources(["title", "body"]);
        assert_eq!(
            build(&handler, DEFAULT_SEARCH_FIELD, Operator::Eq, "hello"),
            Some(Pred::Text(vec!["title".into(), "body".into()], "hello".into()))
        );
    }

    #[test]
    fn test_static_values() {
        assert_eq!(
            FieldHandler::boolean().static_values(),
            Some(vec!["true".to_string(), "false".to_string()])
        );
        assert_eq!(FieldHandler::char().static_values(), None);
        let handler = FieldHandler::char().value_provider(|| vec!["x".to_string()]);
        assert_eq!(handler.static_values(), Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_for_alias_keeps_options() {
        let handler = FieldHandler::integer()
            .sources(["a", "b"])
            .hide_suggestions()
            .use_cache_for_suggestions(false);
        let alias = handler.for_alias("a");
        assert_eq!(alias.kind(), FieldKind::Integer);
        assert_eq!(alias.get_sources("ignored"), vec!["a"]);
        assert!(!alias.shows_suggestions());
        assert!(!alias.uses_cache(true));
    }

    #[test]
    fn test_semantic_mapping() {
        assert_eq!(FieldKind::from_semantic(Some(SemanticType::String)), FieldKind::Char);
        assert_eq!(FieldKind::from_semantic(None), FieldKind::Generic);
    }
}
