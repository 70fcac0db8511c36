//! Backend abstraction.
//!
//! A backend turns `(source, lookup, value)` triples into its native
//! predicate type and knows how to combine predicates. Everything else
//! (resolution, casting, wildcards, negation) happens in the core.

use std::fmt::Debug;

use crate::error::SearchResult;
use crate::field::FieldKind;
use crate::lookup::{Lookup, LookupTable};
use crate::value::FilterValue;

/// A predicate-producing backend.
pub trait Backend: Send + Sync {
    /// Native predicate type.
    type Predicate: Clone + Debug + PartialEq + Send + Sync;

    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Operator→lookup table for a field kind.
    ///
    /// Handler overrides take precedence over this table.
    fn lookups(&self, kind: FieldKind) -> LookupTable {
        kind.default_lookups()
    }

    /// Build a predicate comparing `source` against `value`.
    fn lookup(
        &self,
        source: &str,
        lookup: Lookup,
        value: &FilterValue,
    ) -> SearchResult<Self::Predicate>;

    /// Build a free-text predicate over `sources`.
    ///
    /// Defaults to a disjunction of case-insensitive substring matches.
    fn full_text(&self, sources: &[String], text: &str) -> SearchResult<Self::Predicate> {
        let value = FilterValue::from(text);
        let predicates = sources
            .iter()
            .map(|source| self.lookup(source, Lookup::IContains, &value))
            .collect::<SearchResult<Vec<_>>>()?;
        Ok(self.or(predicates))
    }

    /// Conjunction. Never called with an empty list.
    fn and(&self, predicates: Vec<Self::Predicate>) -> Self::Predicate;

    /// Disjunction. Never called with an empty list.
    fn or(&self, predicates: Vec<Self::Predicate>) -> Self::Predicate;

    /// Negation.
    fn not(&self, predicate: Self::Predicate) -> Self::Predicate;

    /// A predicate matching every record.
    fn match_all(&self) -> Self::Predicate;

    /// A predicate matching nothing.
    fn match_none(&self) -> Self::Predicate;
}

/// Produces candidate values for suggestions.
///
/// Implementations run a distinct/aggregation query over `sources`,
/// restricted to values containing `prefix`, returning at most `limit`
/// values.
pub trait ValueSource: Send + Sync {
    /// Fetch candidate values.
    fn fetch_values(
        &self,
        sources: &[String],
        prefix: &str,
        limit: usize,
    ) -> SearchResult<Vec<String>>;
}

impl<F> ValueSource for F
where
    F: Fn(&[String], &str, usize) -> SearchResult<Vec<String>> + Send + Sync,
{
    fn fetch_values(
        &self,
        sources: &[String],
        prefix: &str,
        limit: usize,
    ) -> SearchResult<Vec<String>> {
        self(sources, prefix, limit)
    }
}

/// A value source that never produces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValues;

impl ValueSource for NoValues {
    fn fetch_values(&self, _: &[String], _: &str, _: usize) -> SearchResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A recording backend whose predicates are plain trees.

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Pred {
        Lookup(String, Lookup, FilterValue),
        Text(Vec<String>, String),
        And(Vec<Pred>),
        Or(Vec<Pred>),
        Not(Box<Pred>),
        All,
        Nothing,
    }

    impl Pred {
        pub fn lookup(source: &str, lookup: Lookup, value: impl Into<FilterValue>) -> Self {
            Self::Lookup(source.to_string(), lookup, value.into())
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct TreeBackend;

    impl Backend for TreeBackend {
        type Predicate = Pred;

        fn name(&self) -> &'static str {
            "tree"
        }

        fn lookup(&self, source: &str, lookup: Lookup, value: &FilterValue) -> SearchResult<Pred> {
            Ok(Pred::Lookup(source.to_string(), lookup, value.clone()))
        }

        fn full_text(&self, sources: &[String], text: &str) -> SearchResult<Pred> {
            Ok(Pred::Text(sources.to_vec(), text.to_string()))
        }

        fn and(&self, mut predicates: Vec<Pred>) -> Pred {
            if predicates.len() == 1 {
                return predicates.remove(0);
            }
            Pred::And(predicates)
        }

        fn or(&self, mut predicates: Vec<Pred>) -> Pred {
            if predicates.len() == 1 {
                return predicates.remove(0);
            }
            Pred::Or(predicates)
        }

        fn not(&self, predicate: Pred) -> Pred {
            Pred::Not(Box::new(predicate))
        }

        fn match_all(&self) -> Pred {
            Pred::All
        }

        fn match_none(&self) -> Pred {
            Pred::Nothing
        }
    }
}
