//! Value suggestions with a prefix-keyed cache.
//!
//! Suggestions come from a handler's static values when it has any, and
//! from the backend [`ValueSource`] otherwise. Lists are deduplicated,
//! stripped of empty values, quote-escaped and capped before they are
//! cached. Prefixes shorter than `CACHE_VALUES_MIN_LENGTH` bypass the cache
//! entirely.

mod key;
mod store;

pub use key::SuggestionKey;
pub use store::{CacheStats, CacheStore, MemoryStore};

use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::ValueSource;
use crate::config::Settings;
use crate::field::FieldHandler;

/// Per-call suggestion options. Unset options follow the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Cache scope; defaults to the field name. A custom key replaces the
    /// field name, so fields queried with the same key share cached lists.
    pub cache_key: Option<String>,
    /// Cap on returned values.
    pub max_count: Option<usize>,
    /// Keep empty values.
    pub allow_empty: Option<bool>,
    /// Sort the result.
    pub sort: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            cache_key: None,
            max_count: None,
            allow_empty: None,
            sort: true,
        }
    }
}

impl SuggestOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope cached lists, e.g. per user.
    ///
    /// The key replaces the field name in the cache key. Include the field
    /// in `key` when several fields use custom keys.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Cap the number of values.
    pub fn max_count(mut self, count: usize) -> Self {
        self.max_count = Some(count);
        self
    }

    /// Keep or drop empty values.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = Some(allow);
        self
    }

    /// Sort or keep source order.
    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }
}

/// Suggestion retrieval bound to one model.
#[derive(Clone)]
pub struct SuggestionCache {
    model: String,
    store: Arc<dyn CacheStore>,
}

impl std::fmt::Debug for SuggestionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionCache")
            .field("model", &self.model)
            .field("stats", &self.store.stats())
            .finish()
    }
}

impl SuggestionCache {
    /// Create a cache over a shared store.
    pub fn new(model: impl Into<String>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            model: model.into(),
            store,
        }
    }

    /// Create a cache with a private in-memory store.
    pub fn in_memory(model: impl Into<String>) -> Self {
        Self::new(model, Arc::new(MemoryStore::default()))
    }

    /// Model identity used in keys.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Store usage counters.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Candidate values for `field` matching `prefix`.
    ///
    /// Never fails: a failing value source is logged and yields nothing.
    pub fn values(
        &self,
        handler: &FieldHandler,
        field: &str,
        prefix: &str,
        options: &SuggestOptions,
        settings: &Settings,
        source: &dyn ValueSource,
    ) -> Vec<String> {
        if !settings.show_suggestions || !handler.shows_suggestions() {
            return Vec::new();
        }

        let cacheable = settings.cache_search_values
            && handler.uses_cache(settings.cache_search_values)
            && prefix.chars().count() >= settings.cache_values_min_length;

        let key = cacheable.then(|| {
            SuggestionKey::new(
                self.model.as_str(),
                options.cache_key.as_deref().unwrap_or(field),
                prefix,
            )
        });

        let cached = key.as_ref().and_then(|key| self.store.get(key));
        if cached.is_some() {
            crate::lucent_debug!(field, prefix, "Suggestion cache hit");
        }
        let mut values = match cached {
            Some(values) => values,
            None => {
                let values = self.compute(handler, field, prefix, options, settings, source);
                if let Some(key) = &key {
                    debug!(key = %key, count = values.len(), "Caching suggestions");
                    self.store.set(key, values.clone(), settings.cache_ttl());
                }
                values
            }
        };

        if options.sort {
            values.sort();
        }
        values
    }

    fn compute(
        &self,
        handler: &FieldHandler,
        field: &str,
        prefix: &str,
        options: &SuggestOptions,
        settings: &Settings,
        source: &dyn ValueSource,
    ) -> Vec<String> {
        let max_count = options
            .max_count
            .unwrap_or(settings.cache_max_values_count_for_one_prefix);
        let allow_empty = options
            .allow_empty
            .unwrap_or(settings.allow_empty_suggestions);

        let raw = match handler.static_values() {
            Some(values) => {
                let needle = prefix.to_lowercase();
                values
                    .into_iter()
                    .filter(|v| v.to_lowercase().contains(&needle))
                    .collect()
            }
            None => match source.fetch_values(&handler.get_sources(field), prefix, max_count) {
                Ok(values) => values,
                Err(e) => {
                    warn!(field, error = %e, "Failed to fetch suggestion values");
                    return Vec::new();
                }
            },
        };

        raw.into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .filter(|v| allow_empty || !settings.is_empty_value(v))
            .map(|v| {
                if settings.escape_quotes_in_suggestions {
                    escape_quotes(&v)
                } else {
                    v
                }
            })
            .take(max_count)
            .collect()
    }
}

/// Backslash-escape single and double quotes.
pub fn escape_quotes(value: &str) -> String {
    value.replace('\'', "\\'").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SearchError, SearchResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        values: Vec<String>,
    }

    impl Counting {
        fn new(values: &[&str]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                values: values.iter().map(|v| v.to_string()).collect(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ValueSource for Counting {
        fn fetch_values(&self, _: &[String], _: &str, _: usize) -> SearchResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.values.clone())
        }
    }

    struct Failing;

    impl ValueSource for Failing {
        fn fetch_values(&self, _: &[String], _: &str, _: usize) -> SearchResult<Vec<String>> {
            Err(SearchError::backend("test", "down"))
        }
    }

    fn cache() -> SuggestionCache {
        SuggestionCache::in_memory("Model")
    }

    #[test]
    fn test_short_prefix_bypasses_cache() {
        let cache = cache();
        let source = Counting::new(&["abc", "abd"]);
        let settings = Settings::default();
        let handler = FieldHandler::char();

        for _ in 0..2 {
            let values = cache.values(&handler, "f", "ab", &SuggestOptions::new(), &settings, &source);
            assert_eq!(values, vec!["abc", "abd"]);
        }
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.stats().writes, 0);
        assert_eq!(cache.stats().hits + cache.stats().misses, 0);
    }

    #[test]
    fn test_long_prefix_is_cached() {
        let cache = cache();
        let source = Counting::new(&["abcd"]);
        let settings = Settings::default();
        let handler = FieldHandler::char();

        for _ in 0..3 {
            cache.values(&handler, "f", "abc", &SuggestOptions::new(), &settings, &source);
        }
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_huge_cache_time_is_cached() {
        let cache = cache();
        let source = Counting::new(&["abcd"]);
        let settings = Settings::from_toml_str("CACHE_TIME = 9223372036854775807").unwrap();
        for _ in 0..2 {
            let values = cache.values(
                &FieldHandler::char(),
                "f",
                "abc",
                &SuggestOptions::new(),
                &settings,
                &source,
            );
            assert_eq!(values, vec!["abcd"]);
        }
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_handler_can_opt_out_of_cache() {
        let cache = cache();
        let source = Counting::new(&["abcd"]);
        let handler = FieldHandler::char().use_cache_for_suggestions(false);
        for _ in 0..2 {
            cache.values(&handler, "f", "abcd", &SuggestOptions::new(), &Settings::default(), &source);
        }
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_dedupe_empty_escape_cap() {
        let cache = cache();
        let source = Counting::new(&["b", "", "a", "b", "it's", "say \"hi\""]);
        let settings = Settings::default().with_cache(false);
        let values = cache.values(
            &FieldHandler::char(),
            "f",
            "",
            &SuggestOptions::new().sort(false),
            &settings,
            &source,
        );
        assert_eq!(values, vec!["b", "a", "it\\'s", "say \\\"hi\\\""]);

        let capped = cache.values(
            &FieldHandler::char(),
            "f",
            "",
            &SuggestOptions::new().max_count(2).allow_empty(true).sort(false),
            &settings,
            &source,
        );
        assert_eq!(capped, vec!["b", ""]);
    }

    #[test]
    fn test_static_values_filter_case_insensitively() {
        let handler = FieldHandler::char().value_provider(|| {
            vec!["Alpha".to_string(), "beta".to_string(), "ALPACA".to_string()]
        });
        let values = cache().values(
            &handler,
            "f",
            "al",
            &SuggestOptions::new(),
            &Settings::default(),
            &Failing,
        );
        assert_eq!(values, vec!["ALPACA", "Alpha"]);
    }

    #[test]
    fn test_hidden_field_and_failing_source() {
        let settings = Settings::default();
        let hidden = FieldHandler::char().hide_suggestions();
        let source = Counting::new(&["x"]);
        assert!(cache().values(&hidden, "f", "x", &SuggestOptions::new(), &settings, &source).is_empty());
        assert_eq!(source.calls(), 0);

        let values = cache().values(&FieldHandler::char(), "f", "abc", &SuggestOptions::new(), &settings, &Failing);
        assert!(values.is_empty());
    }

    #[test]
    fn test_sort_applies_after_cache() {
        let cache = cache();
        let source = Counting::new(&["zeta", "alpha"]);
        let settings = Settings::default();
        let handler = FieldHandler::char();

        let unsorted = cache.values(&handler, "f", "abc", &SuggestOptions::new().sort(false), &settings, &source);
        assert_eq!(unsorted, vec!["zeta", "alpha"]);
        let sorted = cache.values(&handler, "f", "abc", &SuggestOptions::new(), &settings, &source);
        assert_eq!(sorted, vec!["alpha", "zeta"]);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_cache_key_scopes_lists() {
        let cache = cache();
        let source = Counting::new(&["abcd"]);
        let settings = Settings::default();
        let handler = FieldHandler::char();
        cache.values(&handler, "f", "abc", &SuggestOptions::new().cache_key("user-1"), &settings, &source);
        cache.values(&handler, "f", "abc", &SuggestOptions::new().cache_key("user-2"), &settings, &source);
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_custom_cache_key_is_shared_across_fields() {
        let cache = cache();
        let source = Counting::new(&["abcd"]);
        let settings = Settings::default();
        let handler = FieldHandler::char();
        let options = SuggestOptions::new().cache_key("user-1");
        cache.values(&handler, "first", "abc", &options, &settings, &source);
        let values = cache.values(&handler, "last", "abc", &options, &settings, &source);
        assert_eq!(values, vec!["abcd"]);
        assert_eq!(source.calls(), 1);
    }
}
