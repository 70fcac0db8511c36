//! # lucent-parser
//!
//! Reference parser turning Lucene-style filter text into the
//! [`lucent_query::Node`] tree.
//!
//! ## Syntax
//!
//! ```text
//! status: active                   equality (`=` works too)
//! name: "Jane Doe"                 quoted value
//! owner != bob                     negated equality (also `owner! bob`)
//! age > 18    age <= 65            comparisons
//! title ~ "^re"                    regex match
//! a: 1 AND b: 2   a: 1 b: 2        conjunction, explicit or implicit
//! a: 1 OR b: 2                     disjunction
//! NOT a: 1                         negation
//! (a: 1 OR b: 2) AND c: 3          grouping
//! rust                             bare term on the default search field
//! ```
//!
//! Keywords are case-insensitive. `AND` binds tighter than `OR`.
//!
//! ```rust
//! use lucent_parser::parse;
//! use lucent_query::{Node, Operator};
//!
//! let tree = parse("status: active AND NOT age < 18").unwrap();
//! assert_eq!(
//!     tree,
//!     Node::and([
//!         Node::condition("status", Operator::Eq, "active"),
//!         Node::not([Node::condition("age", Operator::Lt, "18")]),
//!     ])
//! );
//! ```

pub mod error;
pub mod grammar;

pub use error::{ParseError, ParseResult};

use grammar::{LucentGrammar, Rule};
use lucent_query::{DEFAULT_SEARCH_FIELD, ExpressionParser, Node, Operator, SearchResult};
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;
use smol_str::SmolStr;
use tracing::trace;

/// Parse an expression, bare terms going to [`DEFAULT_SEARCH_FIELD`].
pub fn parse(input: &str) -> ParseResult<Node> {
    LuceneParser::new().parse_expression(input)
}

/// [`ExpressionParser`] for the Lucene-style syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuceneParser {
    default_field: SmolStr,
}

impl LuceneParser {
    /// Create a parser sending bare terms to [`DEFAULT_SEARCH_FIELD`].
    pub fn new() -> Self {
        Self {
            default_field: SmolStr::new_static(DEFAULT_SEARCH_FIELD),
        }
    }

    /// Send bare terms to `field` instead.
    pub fn with_default_field(mut self, field: impl Into<SmolStr>) -> Self {
        self.default_field = field.into();
        self
    }

    /// The field bare terms are compared against.
    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    /// Parse an expression into a tree.
    pub fn parse_expression(&self, input: &str) -> ParseResult<Node> {
        let mut pairs = LucentGrammar::parse(Rule::expression, input).map_err(|e| {
            let (offset, len) = match e.location {
                InputLocation::Pos(pos) => (pos, 0),
                InputLocation::Span((start, end)) => (start, end.saturating_sub(start)),
            };
            ParseError::syntax(input, offset, len, e.variant.message())
        })?;

        let disjunction = pairs
            .next()
            .and_then(|expression| {
                expression
                    .into_inner()
                    .find(|pair| pair.as_rule() == Rule::disjunction)
            })
            .ok_or_else(|| ParseError::syntax(input, 0, input.len(), "empty expression"))?;

        let node = self.lower(disjunction, input)?;
        trace!(input, tree = %node, "Parsed expression");
        Ok(node)
    }

    fn lower(&self, pair: Pair<'_, Rule>, input: &str) -> ParseResult<Node> {
        let span = pair.as_span();
        match pair.as_rule() {
            Rule::disjunction => self.lower_composite(pair, input, Node::Or),
            Rule::conjunction => self.lower_composite(pair, input, Node::And),
            Rule::unary => {
                let mut negations = 0;
                let mut operand = None;
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::not_op => negations += 1,
                        _ => operand = Some(self.lower(inner, input)?),
                    }
                }
                let len = span.end() - span.start();
                let operand = operand.ok_or_else(|| {
                    ParseError::syntax(input, span.start(), len, "NOT without operand")
                })?;
                Ok((0..negations).fold(operand, |node, _| Node::Not(vec![node])))
            }
            Rule::group => match pair.into_inner().next() {
                Some(inner) => self.lower(inner, input),
                None => Err(ParseError::syntax(input, span.start(), 2, "empty group")),
            },
            Rule::condition => {
                let mut inner = pair.into_inner();
                let (Some(name), Some(operator), Some(value)) =
                    (inner.next(), inner.next(), inner.next())
                else {
                    return Err(ParseError::syntax(
                        input,
                        span.start(),
                        span.end() - span.start(),
                        "incomplete condition",
                    ));
                };
                let op = Operator::from_symbol(operator.as_str()).ok_or_else(|| {
                    let at = operator.as_span();
                    ParseError::syntax(
                        input,
                        at.start(),
                        at.end() - at.start(),
                        format!("unknown operator `{}`", operator.as_str()),
                    )
                })?;
                Ok(Node::condition(name.as_str(), op, value_text(value)))
            }
            Rule::term => match pair.into_inner().next() {
                Some(value) => Ok(Node::condition(
                    self.default_field.clone(),
                    Operator::Eq,
                    value_text(value),
                )),
                None => Err(ParseError::syntax(input, span.start(), 0, "expected a term")),
            },
            rule => Err(ParseError::syntax(
                input,
                span.start(),
                span.end() - span.start(),
                format!("unexpected {:?}", rule),
            )),
        }
    }

    fn lower_composite(
        &self,
        pair: Pair<'_, Rule>,
        input: &str,
        wrap: impl FnOnce(Vec<Node>) -> Node,
    ) -> ParseResult<Node> {
        let mut children = pair
            .into_inner()
            .filter(|inner| !matches!(inner.as_rule(), Rule::and_op | Rule::or_op))
            .map(|inner| self.lower(inner, input))
            .collect::<ParseResult<Vec<_>>>()?;
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return Ok(only);
            }
        }
        Ok(wrap(children))
    }
}

impl Default for LuceneParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionParser for LuceneParser {
    fn parse(&self, raw: &str) -> SearchResult<Node> {
        Ok(self.parse_expression(raw)?)
    }
}

/// The raw text of a bare or quoted value. Quotes are stripped and `\"`
/// unescaped; other escapes are kept for the field handlers.
fn value_text(pair: Pair<'_, Rule>) -> String {
    match pair.as_rule() {
        Rule::quoted => pair
            .into_inner()
            .next()
            .map(|inner| inner.as_str().replace("\\\"", "\""))
            .unwrap_or_default(),
        _ => pair.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cond(name: &str, op: Operator, value: &str) -> Node {
        Node::condition(name, op, value)
    }

    #[test]
    fn test_single_condition() {
        assert_eq!(parse("status: active").unwrap(), cond("status", Operator::Eq, "active"));
        assert_eq!(parse("status=active").unwrap(), cond("status", Operator::Eq, "active"));
    }

    #[test]
    fn test_operators() {
        let cases = [
            ("a != 1", Operator::Neq),
            ("a! 1", Operator::Neq),
            ("a > 1", Operator::Gt),
            ("a >= 1", Operator::Gte),
            ("a < 1", Operator::Lt),
            ("a <= 1", Operator::Lte),
            ("a ~ 1", Operator::Match),
        ];
        for (input, op) in cases {
            assert_eq!(parse(input).unwrap(), cond("a", op, "1"), "{}", input);
        }
    }

    #[test]
    fn test_quoted_values() {
        assert_eq!(
            parse(r#"name: "Jane Doe""#).unwrap(),
            cond("name", Operator::Eq, "Jane Doe")
        );
        assert_eq!(
            parse(r#"quote: "say \"hi\"""#).unwrap(),
            cond("quote", Operator::Eq, "say \"hi\"")
        );
        assert_eq!(parse(r#"a: "or""#).unwrap(), cond("a", Operator::Eq, "or"));
    }

    #[test]
    fn test_escaped_star_is_kept() {
        assert_eq!(parse(r"path: a\*b").unwrap(), cond("path", Operator::Eq, r"a\*b"));
    }

    #[test]
    fn test_precedence_and_grouping() {
        let a = cond("a", Operator::Eq, "1");
        let b = cond("b", Operator::Eq, "2");
        let c = cond("c", Operator::Eq, "3");

        assert_eq!(
            parse("a: 1 OR b: 2 AND c: 3").unwrap(),
            Node::or([a.clone(), Node::and([b.clone(), c.clone()])])
        );
        assert_eq!(
            parse("(a: 1 or b: 2) and c: 3").unwrap(),
            Node::and([Node::or([a.clone(), b.clone()]), c.clone()])
        );
        assert_eq!(parse("a: 1 b: 2").unwrap(), Node::and([a, b]));
    }

    #[test]
    fn test_not() {
        assert_eq!(
            parse("NOT (a: 1 AND b: 2)").unwrap(),
            Node::not([Node::and([cond("a", Operator::Eq, "1"), cond("b", Operator::Eq, "2")])])
        );
        assert_eq!(
            parse("not not a: 1").unwrap(),
            Node::not([Node::not([cond("a", Operator::Eq, "1")])])
        );
    }

    #[test]
    fn test_bare_terms_use_default_field() {
        assert_eq!(
            parse("rust").unwrap(),
            cond(DEFAULT_SEARCH_FIELD, Operator::Eq, "rust")
        );
        let parser = LuceneParser::new().with_default_field("text");
        assert_eq!(
            parser.parse_expression("status: open bug").unwrap(),
            Node::and([cond("status", Operator::Eq, "open"), cond("text", Operator::Eq, "bug")])
        );
    }

    #[test]
    fn test_keyword_like_names() {
        assert_eq!(parse("order: 5").unwrap(), cond("order", Operator::Eq, "5"));
        assert_eq!(parse("android").unwrap(), cond(DEFAULT_SEARCH_FIELD, Operator::Eq, "android"));
    }

    #[test]
    fn test_errors_carry_offset() {
        for input in ["", "a: (", "a: 1 AND", "(a: 1", "a: 1)"] {
            assert!(parse(input).is_err(), "{:?}", input);
        }
        let err = parse("a: 1 AND").unwrap_err();
        assert!(err.offset() >= 5);
    }

    #[test]
    fn test_expression_parser_impl() {
        let parser = LuceneParser::default();
        let err = ExpressionParser::parse(&parser, "a: (").unwrap_err();
        assert!(err.is_bad_value());
        assert!(ExpressionParser::parse(&parser, "a: 1").is_ok());
    }
}
