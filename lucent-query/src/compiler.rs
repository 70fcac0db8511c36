//! AST → backend predicate compilation.
//!
//! Conditions that put no constraint on the result (`field: *`) compile to
//! nothing. Such a child is dropped from a conjunction and makes a
//! disjunction unconstrained. Negating nothing matches nothing, and an
//! unconstrained tree becomes the backend's match-all predicate.
//!
//! `NOT` negates the conjunction of its children as a unit, so
//! `NOT (a, b)` is `¬(a ∧ b)`, never `¬a ∧ ¬b`.

use std::collections::HashMap;
use tracing::debug;

use crate::ast::{Condition, Node, Operator};
use crate::backend::Backend;
use crate::config::Settings;
use crate::error::{SearchError, SearchResult};
use crate::registry::FieldRegistry;

/// Deepest chain of saved searches referring to other saved searches.
pub const MAX_SAVED_SEARCH_DEPTH: usize = 8;

/// Lookup of stored, named filters.
pub trait SavedSearches: Send + Sync {
    /// The stored tree for `name`.
    fn get(&self, name: &str) -> Option<Node>;
}

impl SavedSearches for HashMap<String, Node> {
    fn get(&self, name: &str) -> Option<Node> {
        HashMap::get(self, name).cloned()
    }
}

impl<F> SavedSearches for F
where
    F: Fn(&str) -> Option<Node> + Send + Sync,
{
    fn get(&self, name: &str) -> Option<Node> {
        self(name)
    }
}

/// Compiles trees against one registry and backend.
pub struct QueryCompiler<'a, B: Backend> {
    backend: &'a B,
    registry: &'a FieldRegistry,
    settings: &'a Settings,
    saved: Option<&'a dyn SavedSearches>,
}

impl<'a, B: Backend> QueryCompiler<'a, B> {
    /// Create a compiler.
    pub fn new(backend: &'a B, registry: &'a FieldRegistry, settings: &'a Settings) -> Self {
        Self {
            backend,
            registry,
            settings,
            saved: None,
        }
    }

    /// Resolve the saved-searches pseudo-field through `saved`.
    pub fn with_saved_searches(mut self, saved: &'a dyn SavedSearches) -> Self {
        self.saved = Some(saved);
        self
    }

    /// Compile a tree. An unconstrained tree yields the match-all predicate.
    pub fn compile(&self, node: &Node) -> SearchResult<B::Predicate> {
        let predicate = self
            .compile_partial(node)?
            .unwrap_or_else(|| self.backend.match_all());
        debug!(backend = self.backend.name(), tree = %node, "Compiled filter");
        Ok(predicate)
    }

    /// Compile a tree, returning `None` when it puts no constraint on the
    /// result.
    pub fn compile_partial(&self, node: &Node) -> SearchResult<Option<B::Predicate>> {
        self.compile_node(node, 0)
    }

    fn compile_node(&self, node: &Node, depth: usize) -> SearchResult<Option<B::Predicate>> {
        match node {
            Node::Condition(condition) => self.compile_condition(condition, depth),
            Node::And(children) => self.compile_and(children, depth),
            Node::Or(children) => {
                if children.is_empty() {
                    return Err(SearchError::compile("OR node without children"));
                }
                let compiled = children
                    .iter()
                    .map(|child| self.compile_node(child, depth))
                    .collect::<SearchResult<Vec<_>>>()?;
                Ok(compiled
                    .into_iter()
                    .collect::<Option<Vec<_>>>()
                    .map(|predicates| self.backend.or(predicates)))
            }
            Node::Not(children) => Ok(Some(match self.compile_and(children, depth)? {
                Some(predicate) => self.backend.not(predicate),
                None => self.backend.match_none(),
            })),
        }
    }

    fn compile_and(&self, children: &[Node], depth: usize) -> SearchResult<Option<B::Predicate>> {
        if children.is_empty() {
            return Err(SearchError::compile("AND/NOT node without children"));
        }
        let mut predicates = Vec::with_capacity(children.len());
        for child in children {
            if let Some(predicate) = self.compile_node(child, depth)? {
                predicates.push(predicate);
            }
        }
        if predicates.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.backend.and(predicates)))
        }
    }

    fn compile_condition(
        &self,
        condition: &Condition,
        depth: usize,
    ) -> SearchResult<Option<B::Predicate>> {
        crate::lucent_trace!(
            field = %condition.name,
            operator = ?condition.operator,
            value = %condition.value,
            "Compiling condition"
        );
        let predicate = match self.settings.saved_searches_field() {
            Some(key) if condition.name == key => self.compile_saved(condition, depth)?,
            _ => {
                let handler = self.registry.resolve(&condition.name);
                handler.build(
                    self.backend,
                    &condition.name,
                    condition.operator,
                    &condition.value,
                )?
            }
        };
        Ok(self.negate_if_neq(predicate, condition.operator))
    }

    fn compile_saved(
        &self,
        condition: &Condition,
        depth: usize,
    ) -> SearchResult<Option<B::Predicate>> {
        let saved = self.saved.ok_or_else(|| {
            SearchError::compile("saved searches are enabled but no store is configured")
        })?;
        if depth >= MAX_SAVED_SEARCH_DEPTH {
            return Err(SearchError::compile(format!(
                "saved search `{}` nests deeper than {} levels",
                condition.value, MAX_SAVED_SEARCH_DEPTH
            )));
        }
        let tree = saved.get(&condition.value).ok_or_else(|| {
            SearchError::compile(format!("unknown saved search `{}`", condition.value))
        })?;
        debug!(name = %condition.value, depth, "Expanding saved search");
        self.compile_node(&tree, depth + 1)
    }

    /// Negate a condition's predicate when its operator is NEQ.
    fn negate_if_neq(
        &self,
        predicate: Option<B::Predicate>,
        operator: Operator,
    ) -> Option<B::Predicate> {
        match (predicate, operator) {
            (Some(predicate), Operator::Neq) => Some(self.backend.not(predicate)),
            (predicate, _) => predicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Pred, TreeBackend};
    use crate::field::FieldHandler;
    use crate::lookup::Lookup;
    use crate::registry::FieldDeclarations;
    use crate::schema::{Schema, SemanticType};
    use pretty_assertions::assert_eq;

    fn registry() -> FieldRegistry {
        let declarations = FieldDeclarations::new()
            .field("char_field", FieldHandler::char())
            .field("name", FieldHandler::char().sources(["first", "last"]));
        let schema = Schema::new()
            .field("integer_field", SemanticType::Integer)
            .field("flag", SemanticType::Boolean)
            .field("score", SemanticType::Float);
        FieldRegistry::build(&declarations, &schema).unwrap()
    }

    fn cond(name: &str, op: Operator, value: &str) -> Node {
        Node::condition(name, op, value)
    }

    fn compile(node: &Node) -> SearchResult<Pred> {
        let registry = registry();
        let settings = Settings::default();
        QueryCompiler::new(&TreeBackend, &registry, &settings).compile(node)
    }

    #[test]
    fn test_and_of_char_and_integer() {
        let tree = Node::and([
            cond("char_field", Operator::Eq, "foo"),
            cond("integer_field", Operator::Eq, "5"),
        ]);
        assert_eq!(
            compile(&tree).unwrap(),
            Pred::And(vec![
                Pred::lookup("char_field", Lookup::IContains, "foo"),
                Pred::lookup("integer_field", Lookup::Exact, 5i64),
            ])
        );
    }

    #[test]
    fn test_neq_wraps_in_negation() {
        let tree = cond("char_field", Operator::Neq, "foo");
        assert_eq!(
            compile(&tree).unwrap(),
            Pred::Not(Box::new(Pred::lookup("char_field", Lookup::IExact, "foo")))
        );
    }

    #[test]
    fn test_not_negates_conjunction() {
        let a = cond("char_field", Operator::Eq, "a");
        let b = cond("integer_field", Operator::Gt, "1");
        let not = compile(&Node::not([a.clone(), b.clone()])).unwrap();
        let and = compile(&Node::and([a, b])).unwrap();
        assert_eq!(not, Pred::Not(Box::new(and)));
    }

    #[test]
    fn test_sources_fan_out() {
        assert_eq!(
            compile(&cond("name", Operator::Eq, "v")).unwrap(),
            Pred::Or(vec![
                Pred::lookup("first", Lookup::IContains, "v"),
                Pred::lookup("last", Lookup::IContains, "v"),
            ])
        );
    }

    #[test]
    fn test_match_all_semantics() {
        let star = cond("char_field", Operator::Eq, "*");
        let x = cond("integer_field", Operator::Eq, "1");
        let x_pred = Pred::lookup("integer_field", Lookup::Exact, 1i64);

        assert_eq!(compile(&star).unwrap(), Pred::All);
        assert_eq!(compile(&Node::and([star.clone(), x.clone()])).unwrap(), x_pred);
        assert_eq!(compile(&Node::or([star.clone(), x.clone()])).unwrap(), Pred::All);
        assert_eq!(compile(&Node::not([star.clone()])).unwrap(), Pred::Nothing);
        assert_eq!(
            compile(&cond("char_field", Operator::Neq, "*")).unwrap(),
            Pred::All
        );
    }

    #[test]
    fn test_cast_error_propagates() {
        let err = compile(&cond("integer_field", Operator::Eq, "abc")).unwrap_err();
        assert!(err.is_cast_error());
        let err = compile(&cond("flag", Operator::Eq, "maybe")).unwrap_err();
        assert!(err.is_cast_error());
    }

    #[test]
    fn test_non_finite_float_is_cast_error() {
        assert_eq!(
            compile(&cond("score", Operator::Gt, "2.5")).unwrap(),
            Pred::lookup("score", Lookup::Gt, 2.5f64)
        );
        for raw in ["NaN", "inf"] {
            let err = compile(&cond("score", Operator::Gt, raw)).unwrap_err();
            assert!(err.is_cast_error());
        }
    }

    #[test]
    fn test_unknown_field_uses_default_handler() {
        assert_eq!(
            compile(&cond("whatever", Operator::Eq, "x*")).unwrap(),
            Pred::lookup("whatever", Lookup::IStartsWith, "x")
        );
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let tree = Node::or([
            cond("name", Operator::Eq, "a*"),
            Node::not([cond("flag", Operator::Eq, "TRUE")]),
        ]);
        assert_eq!(compile(&tree).unwrap(), compile(&tree).unwrap());
    }

    #[test]
    fn test_empty_composite_is_compile_error() {
        let err = compile(&Node::Or(vec![])).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::Compile);
    }

    #[test]
    fn test_saved_searches() {
        let registry = registry();
        let settings = Settings::default().with_saved_searches("saved");
        let mut store = HashMap::new();
        store.insert("mine".to_string(), cond("char_field", Operator::Eq, "me"));
        store.insert("loop".to_string(), cond("saved", Operator::Eq, "loop"));

        let compiler =
            QueryCompiler::new(&TreeBackend, &registry, &settings).with_saved_searches(&store);
        assert_eq!(
            compiler.compile(&cond("saved", Operator::Eq, "mine")).unwrap(),
            Pred::lookup("char_field", Lookup::IContains, "me")
        );
        assert_eq!(
            compiler.compile(&cond("saved", Operator::Neq, "mine")).unwrap(),
            Pred::Not(Box::new(Pred::lookup("char_field", Lookup::IContains, "me")))
        );
        assert!(compiler.compile(&cond("saved", Operator::Eq, "missing")).is_err());
        assert!(compiler.compile(&cond("saved", Operator::Eq, "loop")).is_err());
    }

    #[test]
    fn test_saved_search_key_is_plain_field_when_disabled() {
        let store: HashMap<String, Node> = HashMap::new();
        let registry = registry();
        let settings = Settings::default();
        let compiler =
            QueryCompiler::new(&TreeBackend, &registry, &settings).with_saved_searches(&store);
        assert_eq!(
            compiler.compile(&cond("saved", Operator::Eq, "mine")).unwrap(),
            Pred::lookup("saved", Lookup::IExact, "mine")
        );
    }
}
