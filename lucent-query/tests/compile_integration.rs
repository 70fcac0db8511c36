//! Integration tests for registry resolution, compilation and suggestions.
//!
//! These tests drive the public API with a backend that renders predicates
//! as strings, covering:
//! - Operator and wildcard lookups per field kind
//! - NOT/NEQ negation semantics
//! - Alias fan-out and registry precedence
//! - Suggestion caching thresholds

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lucent_query::compiler::QueryCompiler;
use lucent_query::prelude::*;
use lucent_query::{DEFAULT_SEARCH_FIELD, MemoryStore, SuggestionCache};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Render;

impl Backend for Render {
    type Predicate = String;

    fn name(&self) -> &'static str {
        "render"
    }

    fn lookup(&self, source: &str, lookup: Lookup, value: &FilterValue) -> SearchResult<String> {
        Ok(format!("{}__{}={}", source, lookup, value))
    }

    fn and(&self, predicates: Vec<String>) -> String {
        if predicates.len() == 1 {
            return predicates.into_iter().collect();
        }
        format!("({})", predicates.join(" AND "))
    }

    fn or(&self, predicates: Vec<String>) -> String {
        if predicates.len() == 1 {
            return predicates.into_iter().collect();
        }
        format!("({})", predicates.join(" OR "))
    }

    fn not(&self, predicate: String) -> String {
        format!("NOT {}", predicate)
    }

    fn match_all(&self) -> String {
        "ALL".to_string()
    }

    fn match_none(&self) -> String {
        "NONE".to_string()
    }
}

fn declarations() -> FieldDeclarations {
    FieldDeclarations::new()
        .field("char_field", FieldHandler::char())
        .field("person", FieldHandler::char().sources(["first_name", "last_name"]))
        .field("score", FieldHandler::float().sources(["score_a", "score_b"]))
}

fn schema() -> Schema {
    Schema::new()
        .field("integer_field", SemanticType::Integer)
        .field("flag", SemanticType::NullableBoolean)
        .field("created", SemanticType::Timestamp)
        .field("first_name", SemanticType::String)
        .unknown_field("blob")
        .default_search_fields(["first_name", "last_name"])
}

fn compile(tree: &Node) -> SearchResult<String> {
    let registry = FieldRegistry::build(&declarations(), &schema())?;
    let settings = Settings::default();
    QueryCompiler::new(&Render, &registry, &settings).compile(tree)
}

fn cond(name: &str, op: Operator, value: &str) -> Node {
    Node::condition(name, op, value)
}

#[test]
fn test_char_and_integer_conjunction() {
    let tree = Node::and([
        cond("char_field", Operator::Eq, "foo"),
        cond("integer_field", Operator::Eq, "5"),
    ]);
    assert_eq!(
        compile(&tree).unwrap(),
        "(char_field__icontains=foo AND integer_field__exact=5)"
    );
}

#[test]
fn test_char_neq_is_negated_iexact() {
    assert_eq!(
        compile(&cond("char_field", Operator::Neq, "foo")).unwrap(),
        "NOT char_field__iexact=foo"
    );
}

#[test]
fn test_not_negates_conjunction_as_unit() {
    let a = cond("integer_field", Operator::Gt, "1");
    let b = cond("char_field", Operator::Eq, "x");
    assert_eq!(
        compile(&Node::not([a.clone(), b.clone()])).unwrap(),
        format!("NOT {}", compile(&Node::and([a, b])).unwrap())
    );
}

#[test]
fn test_alias_fan_out() {
    assert_eq!(
        compile(&cond("person", Operator::Eq, "ann")).unwrap(),
        "(first_name__icontains=ann OR last_name__icontains=ann)"
    );
    assert_eq!(
        compile(&cond("score", Operator::Gte, "1.5")).unwrap(),
        "(score_a__gte=1.5 OR score_b__gte=1.5)"
    );
}

#[test]
fn test_alias_resolves_to_same_kind() {
    let registry = FieldRegistry::build(&declarations(), &schema()).unwrap();
    for alias in ["score_a", "score_b"] {
        assert_eq!(registry.resolve(alias).kind(), FieldKind::Float);
    }
    // the alias overrides the schema's string type
    assert_eq!(registry.resolve("first_name").kind(), FieldKind::Char);
    assert_eq!(
        compile(&cond("score_a", Operator::Lt, "3")).unwrap(),
        "score_a__lt=3"
    );
}

#[test]
fn test_nullable_boolean_and_timestamp() {
    assert_eq!(
        compile(&cond("flag", Operator::Eq, "NULL")).unwrap(),
        "flag__exact=null"
    );
    assert_eq!(
        compile(&cond("created", Operator::Gte, "2024-01-02")).unwrap(),
        "created__gte=2024-01-02T00:00:00+00:00"
    );
}

#[test]
fn test_wildcards_on_unknown_and_generic_fields() {
    assert_eq!(
        compile(&cond("blob", Operator::Eq, "*abc")).unwrap(),
        "blob__iendswith=abc"
    );
    assert_eq!(
        compile(&cond("blob", Operator::Eq, "a*c")).unwrap(),
        "blob__wildcard=a*c"
    );
    assert_eq!(
        compile(&cond("blob", Operator::Eq, "a\\*c")).unwrap(),
        "blob__iexact=a*c"
    );
}

#[test]
fn test_default_search_field() {
    assert_eq!(
        compile(&cond(DEFAULT_SEARCH_FIELD, Operator::Eq, "rust")).unwrap(),
        "(first_name__icontains=rust OR last_name__icontains=rust)"
    );
}

#[test]
fn test_bad_values_are_cast_errors() {
    for (name, value) in [("integer_field", "five"), ("flag", "maybe"), ("created", "soon")] {
        let err = compile(&cond(name, Operator::Eq, value)).unwrap_err();
        assert!(err.is_cast_error(), "{} = {}", name, value);
        assert!(err.is_bad_value());
    }
}

#[test]
fn test_match_all_in_tree() {
    let tree = Node::or([
        cond("char_field", Operator::Eq, "a"),
        cond("integer_field", Operator::Eq, "*"),
    ]);
    assert_eq!(compile(&tree).unwrap(), "ALL");
}

#[derive(Default)]
struct CountingValues {
    calls: AtomicUsize,
}

impl ValueSource for CountingValues {
    fn fetch_values(
        &self,
        sources: &[String],
        prefix: &str,
        _limit: usize,
    ) -> SearchResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(sources.iter().map(|s| format!("{}:{}", s, prefix)).collect())
    }
}

#[test]
fn test_min_prefix_length_gate() {
    let cache = SuggestionCache::new("People", Arc::new(MemoryStore::default()));
    let values = CountingValues::default();
    let settings = Settings::default();
    let registry = FieldRegistry::build(&declarations(), &schema()).unwrap();
    let handler = registry.suggestion_handler("person").unwrap();

    for _ in 0..2 {
        let out = cache.values(&handler, "person", "ab", &SuggestOptions::new(), &settings, &values);
        assert_eq!(out, vec!["first_name:ab", "last_name:ab"]);
    }
    assert_eq!(values.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().writes, 0);

    for _ in 0..2 {
        cache.values(&handler, "person", "abc", &SuggestOptions::new(), &settings, &values);
    }
    assert_eq!(values.calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.stats().writes, 1);
    assert_eq!(cache.stats().hits, 1);
}
