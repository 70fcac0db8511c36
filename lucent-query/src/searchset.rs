//! The public search facade.
//!
//! A [`SearchSet`] binds field declarations, a backend, its schema and a
//! suggestion cache together and exposes `filter`, `suggest` and `fields`.
//!
//! ```rust
//! use lucent_query::prelude::*;
//! # use lucent_query::SearchResult;
//! # #[derive(Debug, Clone, PartialEq)]
//! # enum P { L(String, Lookup, FilterValue), And(Vec<P>), Or(Vec<P>), Not(Box<P>), All, Nothing }
//! # struct Tree;
//! # impl Backend for Tree {
//! #     type Predicate = P;
//! #     fn name(&self) -> &'static str { "tree" }
//! #     fn lookup(&self, s: &str, l: Lookup, v: &FilterValue) -> SearchResult<P> { Ok(P::L(s.into(), l, v.clone())) }
//! #     fn and(&self, p: Vec<P>) -> P { P::And(p) }
//! #     fn or(&self, p: Vec<P>) -> P { P::Or(p) }
//! #     fn not(&self, p: P) -> P { P::Not(Box::new(p)) }
//! #     fn match_all(&self) -> P { P::All }
//! #     fn match_none(&self) -> P { P::Nothing }
//! # }
//!
//! let set = SearchSet::builder("Ticket", Tree)
//!     .field("status", FieldHandler::char())
//!     .schema(Schema::new().field("priority", SemanticType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let tree = Node::condition("priority", Operator::Gt, "3");
//! assert_eq!(
//!     set.filter_node(&tree).unwrap(),
//!     P::L("priority".into(), Lookup::Gt, FilterValue::Int(3))
//! );
//!
//! // Lenient by default: bad values match nothing.
//! let bad = Node::condition("priority", Operator::Gt, "high");
//! assert_eq!(set.filter_node(&bad).unwrap(), P::Nothing);
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use crate::ast::Node;
use crate::backend::{Backend, NoValues, ValueSource};
use crate::compiler::{QueryCompiler, SavedSearches};
use crate::config::Settings;
use crate::error::{SearchError, SearchResult};
use crate::field::FieldHandler;
use crate::registry::{FieldDeclarations, FieldRegistry, RegistryCell};
use crate::schema::{Schema, SchemaSource};
use crate::suggest::{CacheStats, CacheStore, MemoryStore, SuggestOptions, SuggestionCache};

/// Turns raw filter text into a tree.
pub trait ExpressionParser: Send + Sync {
    /// Parse a raw expression.
    fn parse(&self, raw: &str) -> SearchResult<Node>;
}

impl<F> ExpressionParser for F
where
    F: Fn(&str) -> SearchResult<Node> + Send + Sync,
{
    fn parse(&self, raw: &str) -> SearchResult<Node> {
        self(raw)
    }
}

/// Result of evaluating a raw expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<P> {
    /// The compiled predicate.
    Predicate(P),
    /// The expression could not be compiled; callers may fall back to a
    /// plain-text search over `raw`.
    Fallback {
        /// The raw expression.
        raw: String,
        /// Why compilation failed.
        error: SearchError,
    },
}

impl<P> Outcome<P> {
    /// Check if this is a fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The predicate, if compilation succeeded.
    pub fn predicate(self) -> Option<P> {
        match self {
            Self::Predicate(p) => Some(p),
            Self::Fallback { .. } => None,
        }
    }

    /// Convert into a `Result`, surfacing the fallback error.
    pub fn into_result(self) -> SearchResult<P> {
        match self {
            Self::Predicate(p) => Ok(p),
            Self::Fallback { error, .. } => Err(error),
        }
    }
}

/// Search facade for one model on one backend.
pub struct SearchSet<B: Backend> {
    model: String,
    backend: B,
    declarations: FieldDeclarations,
    schema: Arc<dyn SchemaSource>,
    values: Arc<dyn ValueSource>,
    parser: Option<Arc<dyn ExpressionParser>>,
    saved: Option<Arc<dyn SavedSearches>>,
    settings: Settings,
    registry: RegistryCell,
    suggestions: SuggestionCache,
}

impl<B: Backend> SearchSet<B> {
    /// Start building a search set for `model`.
    pub fn builder(model: impl Into<String>, backend: B) -> SearchSetBuilder<B> {
        SearchSetBuilder::new(model, backend)
    }

    /// Model identity.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The memoized field registry, built on first use.
    pub fn registry(&self) -> SearchResult<Arc<FieldRegistry>> {
        self.registry.get_or_try_init(|| {
            let schema = self.schema.introspect()?;
            FieldRegistry::build(&self.declarations, &schema)
        })
    }

    /// Drop the memoized registry, e.g. after a schema migration.
    pub fn refresh(&self) {
        self.registry.invalidate();
    }

    /// Parse, compile and apply the error policy.
    ///
    /// In lenient mode (the default) a bad expression yields the backend's
    /// match-nothing predicate; with `raise_on_error` the error is returned.
    pub fn filter(&self, raw: &str) -> SearchResult<B::Predicate> {
        let outcome = self.evaluate(raw)?;
        self.apply_policy(outcome)
    }

    /// Compile an already parsed tree and apply the error policy.
    pub fn filter_node(&self, node: &Node) -> SearchResult<B::Predicate> {
        let outcome = self.evaluate_node(node, || node.to_string())?;
        self.apply_policy(outcome)
    }

    /// Parse and compile without applying the error policy.
    ///
    /// Parse, cast and compile failures become [`Outcome::Fallback`].
    /// Misconfiguration (no parser, invalid declarations, failed
    /// introspection) is returned as an error.
    pub fn evaluate(&self, raw: &str) -> SearchResult<Outcome<B::Predicate>> {
        let parser = self
            .parser
            .as_ref()
            .ok_or_else(|| SearchError::NoParser(self.model.clone()))?;
        match parser.parse(raw) {
            Ok(node) => self.evaluate_node(&node, || raw.to_string()),
            Err(error) => Ok(Outcome::Fallback {
                raw: raw.to_string(),
                error,
            }),
        }
    }

    fn evaluate_node(
        &self,
        node: &Node,
        raw: impl FnOnce() -> String,
    ) -> SearchResult<Outcome<B::Predicate>> {
        let registry = self.registry()?;
        let mut compiler = QueryCompiler::new(&self.backend, &registry, &self.settings);
        if let Some(saved) = &self.saved {
            compiler = compiler.with_saved_searches(saved.as_ref());
        }
        Ok(match compiler.compile(node) {
            Ok(predicate) => Outcome::Predicate(predicate),
            Err(error) => Outcome::Fallback { raw: raw(), error },
        })
    }

    fn apply_policy(&self, outcome: Outcome<B::Predicate>) -> SearchResult<B::Predicate> {
        match outcome {
            Outcome::Predicate(predicate) => Ok(predicate),
            Outcome::Fallback { error, .. } if self.settings.raise_on_error => Err(error),
            Outcome::Fallback { raw, error } => {
                warn!(
                    model = %self.model,
                    raw = %raw,
                    error = %error,
                    code = %error.code(),
                    "Filter failed; matching nothing"
                );
                Ok(self.backend.match_none())
            }
        }
    }

    /// Value suggestions for `field` starting from `prefix`.
    ///
    /// Unknown, excluded and suggestion-less fields yield an empty list.
    pub fn suggest(
        &self,
        field: &str,
        prefix: &str,
        options: &SuggestOptions,
    ) -> SearchResult<Vec<String>> {
        let registry = self.registry()?;
        Ok(match registry.suggestion_handler(field) {
            Some(handler) => self.suggestions.values(
                &handler,
                field,
                prefix,
                options,
                &self.settings,
                self.values.as_ref(),
            ),
            None => Vec::new(),
        })
    }

    /// Queryable field names, without mapping exclusions.
    pub fn fields(&self) -> SearchResult<Vec<String>> {
        Ok(self
            .registry()?
            .fields()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Queryable field names with their suggestion flag.
    pub fn fields_with_suggestions(&self) -> SearchResult<IndexMap<String, bool>> {
        let registry = self.registry()?;
        let mut flags = registry.fields_with_suggestions();
        if !self.settings.show_suggestions {
            flags.values_mut().for_each(|flag| *flag = false);
        }
        Ok(flags)
    }

    /// Every source of every declared field.
    pub fn declared_sources(&self) -> SearchResult<Vec<String>> {
        Ok(self
            .registry()?
            .declared_sources()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Suggestion cache counters.
    pub fn suggestion_stats(&self) -> CacheStats {
        self.suggestions.stats()
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for SearchSet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSet")
            .field("model", &self.model)
            .field("backend", &self.backend)
            .field("declarations", &self.declarations)
            .field("has_parser", &self.parser.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for [`SearchSet`].
pub struct SearchSetBuilder<B: Backend> {
    model: String,
    backend: B,
    declarations: FieldDeclarations,
    schema: Option<Arc<dyn SchemaSource>>,
    values: Option<Arc<dyn ValueSource>>,
    parser: Option<Arc<dyn ExpressionParser>>,
    saved: Option<Arc<dyn SavedSearches>>,
    settings: Settings,
    store: Option<Arc<dyn CacheStore>>,
}

impl<B: Backend> SearchSetBuilder<B> {
    /// Create a builder.
    pub fn new(model: impl Into<String>, backend: B) -> Self {
        Self {
            model: model.into(),
            backend,
            declarations: FieldDeclarations::new(),
            schema: None,
            values: None,
            parser: None,
            saved: None,
            settings: Settings::default(),
            store: None,
        }
    }

    /// Declare a single field.
    pub fn field(mut self, name: impl Into<String>, handler: FieldHandler) -> Self {
        self.declarations = self.declarations.field(name, handler);
        self
    }

    /// Merge a declaration set; later sets win on name clashes.
    pub fn declarations(mut self, declarations: FieldDeclarations) -> Self {
        self.declarations = self.declarations.extend(declarations);
        self
    }

    /// Where the backend schema comes from. Defaults to an empty schema.
    pub fn schema(mut self, schema: impl SchemaSource + 'static) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Where suggestion values come from. Defaults to nothing.
    pub fn values(mut self, values: impl ValueSource + 'static) -> Self {
        self.values = Some(Arc::new(values));
        self
    }

    /// The expression parser used by [`SearchSet::filter`].
    pub fn parser(mut self, parser: impl ExpressionParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// The saved-searches store.
    pub fn saved_searches(mut self, saved: impl SavedSearches + 'static) -> Self {
        self.saved = Some(Arc::new(saved));
        self
    }

    /// Settings. Defaults to [`Settings::default`].
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Share a suggestion cache store between search sets.
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Finish the search set.
    pub fn build(self) -> SearchResult<SearchSet<B>> {
        self.settings.validate()?;
        self.declarations.validate()?;
        if self.settings.saved_searches_enable && self.saved.is_none() {
            return Err(SearchError::config(
                "SAVED_SEARCHES_ENABLE is set but no saved-searches store was given",
            ));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::default()));

        Ok(SearchSet {
            suggestions: SuggestionCache::new(self.model.as_str(), store),
            model: self.model,
            backend: self.backend,
            declarations: self.declarations,
            schema: self.schema.unwrap_or_else(|| Arc::new(Schema::new())),
            values: self.values.unwrap_or_else(|| Arc::new(NoValues)),
            parser: self.parser,
            saved: self.saved,
            settings: self.settings,
            registry: RegistryCell::new(),
        })
    }
}
