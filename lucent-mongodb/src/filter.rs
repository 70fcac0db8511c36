//! MongoDB filter building utilities.

use bson::{Bson, Document, doc};

/// Builder for MongoDB filter documents.
///
/// ```rust
/// use lucent_mongodb::FilterBuilder;
///
/// let filter = FilterBuilder::new()
///     .eq("status", "active")
///     .gte("age", 18)
///     .regex("email", r"@example\.com$", "i")
///     .build();
///
/// assert_eq!(filter.get_str("status").unwrap(), "active");
/// assert!(filter.get_document("email").unwrap().contains_key("$regex"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    doc: Document,
}

impl FilterBuilder {
    /// Create a new empty filter builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    /// Add a greater-than condition.
    pub fn gt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$gt", value)
    }

    /// Add a greater-than-or-equal condition.
    pub fn gte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$gte", value)
    }

    /// Add a less-than condition.
    pub fn lt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$lt", value)
    }

    /// Add a less-than-or-equal condition.
    pub fn lte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$lte", value)
    }

    /// Add a regex condition. Empty `options` are omitted.
    pub fn regex(mut self, field: &str, pattern: &str, options: &str) -> Self {
        let mut condition = doc! { "$regex": pattern };
        if !options.is_empty() {
            condition.insert("$options", options);
        }
        self.doc.insert(field, condition);
        self
    }

    /// Add a text search over the collection's text index.
    pub fn text_search(mut self, search: &str) -> Self {
        self.doc.insert("$text", doc! { "$search": search });
        self
    }

    /// Build the filter document.
    pub fn build(self) -> Document {
        self.doc
    }

    /// Check if the filter is empty.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    // Operators on the same field are merged into one sub-document so
    // `gte(..).lt(..)` expresses a range.
    fn operator(mut self, field: &str, op: &str, value: impl Into<Bson>) -> Self {
        match self.doc.get_mut(field) {
            Some(Bson::Document(existing)) => {
                existing.insert(op, value.into());
            }
            _ => {
                let mut condition = Document::new();
                condition.insert(op, value.into());
                self.doc.insert(field, condition);
            }
        }
        self
    }
}

/// An empty filter (matches all documents).
pub fn all() -> Document {
    doc! {}
}

/// A filter matching no document.
pub fn nothing() -> Document {
    doc! { "$expr": false }
}

/// Check if `filter` is the match-nothing filter.
pub fn is_nothing(filter: &Document) -> bool {
    filter.len() == 1 && filter.get("$expr") == Some(&Bson::Boolean(false))
}

/// `$and` of `filters`. Empty members are dropped, a single member is
/// returned as is, and a match-nothing member wins.
pub fn and(filters: Vec<Document>) -> Document {
    if filters.iter().any(is_nothing) {
        return nothing();
    }
    let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_empty()).collect();
    match filters.len() {
        0 => all(),
        1 => filters.pop().unwrap_or_default(),
        _ => doc! { "$and": filters },
    }
}

/// `$or` of `filters`. An empty member makes the whole filter empty;
/// match-nothing members are dropped.
pub fn or(filters: Vec<Document>) -> Document {
    if filters.is_empty() || filters.iter().any(Document::is_empty) {
        return all();
    }
    let mut filters: Vec<_> = filters.into_iter().filter(|f| !is_nothing(f)).collect();
    match filters.len() {
        0 => nothing(),
        1 => filters.pop().unwrap_or_default(),
        _ => doc! { "$or": filters },
    }
}

/// Negation as `$nor` of a single filter.
pub fn not(filter: Document) -> Document {
    if filter.is_empty() {
        return nothing();
    }
    if is_nothing(&filter) {
        return all();
    }
    doc! { "$nor": [filter] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filter_builder_eq() {
        let filter = FilterBuilder::new().eq("name", "Alice").eq("age", 30).build();

        assert_eq!(filter.get_str("name").unwrap(), "Alice");
        assert_eq!(filter.get_i32("age").unwrap(), 30);
    }

    #[test]
    fn test_filter_builder_range_merges() {
        let filter = FilterBuilder::new().gte("age", 18).lt("age", 65).build();
        assert_eq!(filter, doc! { "age": { "$gte": 18, "$lt": 65 } });
    }

    #[test]
    fn test_filter_builder_regex() {
        let filter = FilterBuilder::new().regex("email", r"@example\.com$", "").build();
        let email = filter.get_document("email").unwrap();
        assert!(email.contains_key("$regex"));
        assert!(!email.contains_key("$options"));
    }

    #[test]
    fn test_filter_builder_text_search() {
        let filter = FilterBuilder::new().text_search("hello world").build();
        assert_eq!(filter, doc! { "$text": { "$search": "hello world" } });
    }

    #[test]
    fn test_combinators() {
        let a = doc! { "a": 1 };
        let b = doc! { "b": 2 };

        assert_eq!(and(vec![a.clone(), all()]), a);
        assert_eq!(and(vec![a.clone(), nothing()]), nothing());
        assert_eq!(and(vec![a.clone(), b.clone()]), doc! { "$and": [a.clone(), b.clone()] });

        assert_eq!(or(vec![a.clone(), all()]), all());
        assert_eq!(or(vec![a.clone(), nothing()]), a);
        assert_eq!(or(vec![a.clone(), b.clone()]), doc! { "$or": [a.clone(), b] });

        assert_eq!(not(a.clone()), doc! { "$nor": [a] });
        assert_eq!(not(all()), nothing());
        assert_eq!(not(nothing()), all());
    }
}
