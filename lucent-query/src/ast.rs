//! Boolean expression AST consumed by the compiler.
//!
//! Trees are produced by an [`ExpressionParser`](crate::ExpressionParser)
//! and are immutable once built. Composite nodes never have an empty child
//! list.
//!
//! ```rust
//! use lucent_query::ast::{Node, Operator};
//!
//! let tree = Node::and([
//!     Node::condition("status", Operator::Eq, "active"),
//!     Node::or([
//!         Node::condition("region", Operator::Eq, "eu*"),
//!         Node::condition("priority", Operator::Gt, "3"),
//!     ]),
//! ]);
//!
//! assert_eq!(
//!     tree.to_string(),
//!     "(status: active AND (region: eu* OR priority > 3))"
//! );
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    /// `field: value`
    Eq,
    /// `field != value` or `field! value`
    Neq,
    /// `field > value`
    Gt,
    /// `field < value`
    Lt,
    /// `field >= value`
    Gte,
    /// `field <= value`
    Lte,
    /// `field ~ value`
    Match,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 7] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::Match,
    ];

    /// The canonical textual form of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => ":",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Match => "~",
        }
    }

    /// Parse an operator symbol. Both `!=` and `!` mean [`Operator::Neq`],
    /// both `:` and `=` mean [`Operator::Eq`].
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol.trim() {
            ":" | "=" => Self::Eq,
            "!=" | "!" | "!:" => Self::Neq,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "~" => Self::Match,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Leaf node: a single comparison of a field against a raw value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Field name as typed by the user.
    pub name: SmolStr,
    /// Comparison operator.
    pub operator: Operator,
    /// Raw, uncast value.
    pub value: String,
}

impl Condition {
    /// Create a new condition.
    pub fn new(name: impl Into<SmolStr>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Eq => write!(f, "{}: {}", self.name, self.value),
            op => write!(f, "{} {} {}", self.name, op, self.value),
        }
    }
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    /// A single comparison.
    Condition(Condition),
    /// Conjunction of the children.
    And(Vec<Node>),
    /// Disjunction of the children.
    Or(Vec<Node>),
    /// Negation of the conjunction of the children.
    Not(Vec<Node>),
}

impl Node {
    /// Create a condition node.
    pub fn condition(name: impl Into<SmolStr>, operator: Operator, value: impl Into<String>) -> Self {
        Self::Condition(Condition::new(name, operator, value))
    }

    /// Create an AND node.
    pub fn and(children: impl IntoIterator<Item = Node>) -> Self {
        Self::And(children.into_iter().collect())
    }

    /// Create an OR node.
    pub fn or(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    /// Create a NOT node.
    pub fn not(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Not(children.into_iter().collect())
    }

    /// Check if this is a leaf.
    pub fn is_condition(&self) -> bool {
        matches!(self, Self::Condition(_))
    }

    /// Iterate over every condition in the tree, depth first.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Self::Condition(c) => out.push(c),
            Self::And(children) | Self::Or(children) | Self::Not(children) => {
                for child in children {
                    child.collect_conditions(out);
                }
            }
        }
    }

    /// Depth of the tree; a single condition has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::And(children) | Self::Or(children) | Self::Not(children) => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
        }
    }
}

impl From<Condition> for Node {
    fn from(c: Condition) -> Self {
        Self::Condition(c)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Node], sep: &str) -> fmt::Result {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{}", child)?;
            }
            Ok(())
        }

        match self {
            Self::Condition(c) => write!(f, "{}", c),
            Self::And(children) => {
                f.write_str("(")?;
                join(f, children, " AND ")?;
                f.write_str(")")
            }
            Self::Or(children) => {
                f.write_str("(")?;
                join(f, children, " OR ")?;
                f.write_str(")")
            }
            Self::Not(children) => {
                f.write_str("NOT (")?;
                join(f, children, " AND ")?;
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::from_symbol("!"), Some(Operator::Neq));
        assert_eq!(Operator::from_symbol("!="), Some(Operator::Neq));
        assert_eq!(Operator::from_symbol(">="), Some(Operator::Gte));
        assert_eq!(Operator::from_symbol("?"), None);
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn test_conditions_depth_first() {
        let tree = Node::and([
            Node::condition("a", Operator::Eq, "1"),
            Node::not([Node::condition("b", Operator::Eq, "2")]),
        ]);
        let names: Vec<_> = tree.conditions().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_display_not() {
        let tree = Node::not([
            Node::condition("a", Operator::Eq, "1"),
            Node::condition("b", Operator::Neq, "2"),
        ]);
        assert_eq!(tree.to_string(), "NOT (a: 1 AND b != 2)");
    }
}
