//! Pest grammar for filter expressions.

use pest_derive::Parser;

/// The filter expression grammar.
#[derive(Parser)]
#[grammar = "lucent.pest"]
pub struct LucentGrammar;

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    fn full(rule: Rule, input: &str) -> bool {
        LucentGrammar::parse(rule, input)
            .map(|mut pairs| pairs.next().map(|p| p.as_str().len()) == Some(input.len()))
            .unwrap_or(false)
    }

    #[test]
    fn test_parse_name() {
        assert!(full(Rule::name, "created_at"));
        assert!(full(Rule::name, "author.email"));
        assert!(full(Rule::name, "order"));
        assert!(!full(Rule::name, "OR"));
    }

    #[test]
    fn test_parse_operator() {
        for op in ["!=", "!", ">=", "<=", ">", "<", ":", "=", "~"] {
            assert!(full(Rule::operator, op), "{}", op);
        }
    }

    #[test]
    fn test_parse_condition() {
        assert!(full(Rule::condition, "status: active"));
        assert!(full(Rule::condition, "name:\"Jane Doe\""));
        assert!(full(Rule::condition, "age >= 18"));
        assert!(full(Rule::condition, "path: a\\*b"));
    }

    #[test]
    fn test_keywords_need_a_boundary() {
        assert!(LucentGrammar::parse(Rule::keyword, "AND ").is_ok());
        assert!(LucentGrammar::parse(Rule::keyword, "android").is_err());
        assert!(LucentGrammar::parse(Rule::keyword, "not:").is_err());
    }

    #[test]
    fn test_parse_expression() {
        assert!(LucentGrammar::parse(Rule::expression, "a: 1 AND (b: 2 OR NOT c: 3)").is_ok());
        assert!(LucentGrammar::parse(Rule::expression, "a: 1 AND").is_err());
        assert!(LucentGrammar::parse(Rule::expression, "").is_err());
    }
}
