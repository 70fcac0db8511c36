//! Saved searches stored as raw expressions.

use std::collections::HashMap;
use std::sync::Arc;

use lucent_parser::LuceneParser;
use lucent_query::{Node, SavedSearches, SearchResult};
use parking_lot::RwLock;
use tracing::debug;

/// Named filters registered as raw expressions.
///
/// Expressions are parsed when registered, so a broken saved search is
/// rejected up front instead of failing every filter that uses it. Clones
/// share the same store.
///
/// ```rust
/// use lucent::StoredExpressions;
/// use lucent::query::SavedSearches;
///
/// let saved = StoredExpressions::new();
/// saved.register("open", "status: open AND NOT archived: true").unwrap();
/// assert!(saved.register("broken", "status: (").is_err());
///
/// assert!(saved.get("open").is_some());
/// assert!(saved.get("broken").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoredExpressions {
    parser: LuceneParser,
    entries: Arc<RwLock<HashMap<String, Node>>>,
}

impl StoredExpressions {
    /// Create an empty store using the default parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store parsing with `parser`.
    pub fn with_parser(parser: LuceneParser) -> Self {
        Self {
            parser,
            entries: Arc::default(),
        }
    }

    /// Parse `raw` and store it under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, raw: &str) -> SearchResult<()> {
        let name = name.into();
        let tree = self.parser.parse_expression(raw)?;
        debug!(name = %name, tree = %tree, "Registered saved search");
        self.entries.write().insert(name, tree);
        Ok(())
    }

    /// Store an already parsed tree under `name`.
    pub fn insert(&self, name: impl Into<String>, tree: Node) {
        self.entries.write().insert(name.into(), tree);
    }

    /// Remove a saved search, returning its tree.
    pub fn remove(&self, name: &str) -> Option<Node> {
        self.entries.write().remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of saved searches.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SavedSearches for StoredExpressions {
    fn get(&self, name: &str) -> Option<Node> {
        self.entries.read().get(name).cloned()
    }
}
