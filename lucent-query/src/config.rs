//! Search settings.
//!
//! Settings are plain data, loadable from TOML. Keys use the upper-case
//! option names; `${VAR}` references are replaced with environment values
//! before parsing.
//!
//! ```rust
//! use lucent_query::Settings;
//!
//! let settings = Settings::from_toml_str(r#"
//!     SAVED_SEARCHES_ENABLE = true
//!     SAVED_SEARCHES_KEY = "saved"
//!     CACHE_VALUES_MIN_LENGTH = 2
//! "#).unwrap();
//!
//! assert!(settings.saved_searches_enable);
//! assert_eq!(settings.cache_values_min_length, 2);
//! assert_eq!(settings.cache_max_values_count_for_one_prefix, 10);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{SearchError, SearchResult};

/// Search behavior settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Resolve the saved-searches pseudo-field.
    #[serde(rename = "SAVED_SEARCHES_ENABLE")]
    pub saved_searches_enable: bool,

    /// Pseudo-field name that refers to saved searches.
    #[serde(rename = "SAVED_SEARCHES_KEY")]
    pub saved_searches_key: Option<String>,

    /// Global switch for suggestion caching.
    #[serde(rename = "CACHE_SEARCH_VALUES")]
    pub cache_search_values: bool,

    /// Suggestion cache TTL, in seconds.
    #[serde(rename = "CACHE_TIME")]
    pub cache_time: u64,

    /// Default cap on suggestions per prefix.
    #[serde(rename = "CACHE_MAX_VALUES_COUNT_FOR_ONE_PREFIX")]
    pub cache_max_values_count_for_one_prefix: usize,

    /// Shortest prefix that is read from or written to the cache.
    #[serde(rename = "CACHE_VALUES_MIN_LENGTH")]
    pub cache_values_min_length: usize,

    /// Keep empty values in suggestions.
    #[serde(rename = "ALLOW_EMPTY_SUGGESTIONS")]
    pub allow_empty_suggestions: bool,

    /// Global switch for suggestions.
    #[serde(rename = "SHOW_SUGGESTIONS")]
    pub show_suggestions: bool,

    /// Backslash-escape quotes in suggested values.
    #[serde(rename = "ESCAPE_QUOTES_IN_SUGGESTIONS")]
    pub escape_quotes_in_suggestions: bool,

    /// Re-raise filter errors instead of returning an empty-result predicate.
    #[serde(rename = "RAISE_ON_ERROR")]
    pub raise_on_error: bool,

    /// Values treated as empty.
    #[serde(rename = "EMPTY_VALUES")]
    pub empty_values: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            saved_searches_enable: false,
            saved_searches_key: None,
            cache_search_values: true,
            cache_time: 6000,
            cache_max_values_count_for_one_prefix: 10,
            cache_values_min_length: 3,
            allow_empty_suggestions: false,
            show_suggestions: true,
            escape_quotes_in_suggestions: true,
            raise_on_error: false,
            empty_values: vec![String::new()],
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(content: &str) -> SearchResult<Self> {
        let expanded = expand_env_vars(content)?;
        let settings: Self =
            toml::from_str(&expanded).map_err(|e| SearchError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check option consistency.
    pub fn validate(&self) -> SearchResult<()> {
        if self.saved_searches_enable
            && self.saved_searches_key.as_deref().is_none_or(str::is_empty)
        {
            return Err(SearchError::config(
                "SAVED_SEARCHES_ENABLE requires SAVED_SEARCHES_KEY",
            ));
        }
        Ok(())
    }

    /// The saved-searches pseudo-field, if saved searches are enabled.
    pub fn saved_searches_field(&self) -> Option<&str> {
        if self.saved_searches_enable {
            self.saved_searches_key.as_deref()
        } else {
            None
        }
    }

    /// Suggestion cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_time)
    }

    /// Check if a value counts as empty.
    pub fn is_empty_value(&self, value: &str) -> bool {
        self.empty_values.iter().any(|v| v == value)
    }

    /// Enable saved searches under `key`.
    pub fn with_saved_searches(mut self, key: impl Into<String>) -> Self {
        self.saved_searches_enable = true;
        self.saved_searches_key = Some(key.into());
        self
    }

    /// Switch between strict and lenient filtering.
    pub fn with_raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Switch suggestion caching.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_search_values = enabled;
        self
    }

    /// Set the minimum cached prefix length.
    pub fn with_cache_min_length(mut self, len: usize) -> Self {
        self.cache_values_min_length = len;
        self
    }
}

/// Expand `${VAR}` references. Unset variables are left as written.
fn expand_env_vars(content: &str) -> SearchResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| SearchError::config(e.to_string()))?;
    let mut result = content.to_string();

    for cap in re.captures_iter(content) {
        if let Ok(value) = std::env::var(&cap[1]) {
            result = result.replace(&cap[0], &value);
        }
    }

    Ok(result)
}
