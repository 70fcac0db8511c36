//! Suggestion cache keys.

use std::fmt::{self, Display};

/// Key of one cached suggestion list.
///
/// Rendered as `prefix:model:cache_key:value_prefix`. The field is not part
/// of the key; callers scope lists per field through `cache_key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuggestionKey {
    namespace: String,
    model: String,
    cache_key: String,
    prefix: String,
}

impl SuggestionKey {
    /// Create a key in the default `lucent` namespace.
    pub fn new(
        model: impl Into<String>,
        cache_key: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            namespace: "lucent".to_string(),
            model: model.into(),
            cache_key: cache_key.into(),
            prefix: prefix.into(),
        }
    }

    /// Use a custom namespace, e.g. to share a store between applications.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The full key string.
    pub fn as_str(&self) -> String {
        let mut key = String::with_capacity(
            self.namespace.len() + self.model.len() + self.cache_key.len() + self.prefix.len() + 3,
        );
        key.push_str(&self.namespace);
        key.push(':');
        key.push_str(&self.model);
        key.push(':');
        key.push_str(&self.cache_key);
        key.push(':');
        key.push_str(&self.prefix);
        key
    }

    /// Model identity.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Caller-supplied cache key.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Value prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Display for SuggestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}
