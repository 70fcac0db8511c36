//! Wildcard detection for textual fields.
//!
//! A `*` at either end of a value anchors a prefix, suffix or substring
//! match; a `*` anywhere else turns the value into a verbatim wildcard
//! pattern. `\*` is a literal star.

use crate::lookup::Lookup;

/// Classified textual value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// No unescaped star; escapes removed.
    Literal(String),
    /// `abc*`
    Prefix(String),
    /// `*abc`
    Suffix(String),
    /// `*abc*`
    Contains(String),
    /// `a*c`, kept verbatim.
    Wildcard(String),
}

impl Pattern {
    /// Classify a raw value.
    pub fn parse(raw: &str) -> Self {
        let stars = unescaped_stars(raw);
        if stars.is_empty() {
            return Self::Literal(unescape(raw));
        }

        let last = raw.len() - 1;
        let leading = stars.first() == Some(&0);
        let trailing = stars.last() == Some(&last);
        let interior = stars
            .iter()
            .any(|&i| !(leading && i == 0) && !(trailing && i == last));
        if interior {
            return Self::Wildcard(raw.to_string());
        }

        let start = usize::from(leading);
        let end = if trailing { last } else { raw.len() };
        let inner = if start >= end {
            String::new()
        } else {
            unescape(&raw[start..end])
        };

        match (leading, trailing) {
            (true, true) => Self::Contains(inner),
            (true, false) => Self::Suffix(inner),
            _ => Self::Prefix(inner),
        }
    }

    /// The lookup implied by the pattern, or `None` for a literal.
    pub fn lookup(&self, case_sensitive: bool) -> Option<Lookup> {
        Some(match (self, case_sensitive) {
            (Self::Literal(_), _) => return None,
            (Self::Prefix(_), true) => Lookup::StartsWith,
            (Self::Prefix(_), false) => Lookup::IStartsWith,
            (Self::Suffix(_), true) => Lookup::EndsWith,
            (Self::Suffix(_), false) => Lookup::IEndsWith,
            (Self::Contains(_), true) => Lookup::Contains,
            (Self::Contains(_), false) => Lookup::IContains,
            (Self::Wildcard(_), _) => Lookup::Wildcard,
        })
    }

    /// The value to compare against.
    pub fn into_value(self) -> String {
        match self {
            Self::Literal(v)
            | Self::Prefix(v)
            | Self::Suffix(v)
            | Self::Contains(v)
            | Self::Wildcard(v) => v,
        }
    }
}

fn unescaped_stars(raw: &str) -> Vec<usize> {
    let bytes = raw.as_bytes();
    let mut out = Vec::new();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\\' if !escaped => escaped = true,
            b'*' if !escaped => out.push(i),
            _ => escaped = false,
        }
        if b != b'\\' {
            escaped = false;
        }
    }
    out
}

/// Replace `\*` with `*`.
pub fn unescape(raw: &str) -> String {
    raw.replace("\\*", "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_patterns() {
        assert_eq!(Pattern::parse("abc*"), Pattern::Prefix("abc".into()));
        assert_eq!(Pattern::parse("*abc"), Pattern::Suffix("abc".into()));
        assert_eq!(Pattern::parse("*abc*"), Pattern::Contains("abc".into()));
        assert_eq!(Pattern::parse("abc"), Pattern::Literal("abc".into()));
    }

    #[test]
    fn test_interior_star_is_verbatim_wildcard() {
        assert_eq!(Pattern::parse("a*c"), Pattern::Wildcard("a*c".into()));
        assert_eq!(Pattern::parse("*a*c"), Pattern::Wildcard("*a*c".into()));
        assert_eq!(Pattern::parse("a*c").lookup(false), Some(Lookup::Wildcard));
    }

    #[test]
    fn test_escaped_star_is_literal() {
        assert_eq!(Pattern::parse("a\\*c"), Pattern::Literal("a*c".into()));
        assert_eq!(Pattern::parse("a\\*"), Pattern::Literal("a*".into()));
        assert_eq!(Pattern::parse("\\*abc*"), Pattern::Prefix("*abc".into()));
    }

    #[test]
    fn test_stripping_to_empty() {
        assert_eq!(Pattern::parse("**"), Pattern::Contains(String::new()));
        assert_eq!(Pattern::parse("*"), Pattern::Contains(String::new()));
    }

    #[test]
    fn test_case_sensitivity() {
        let p = Pattern::parse("abc*");
        assert_eq!(p.lookup(true), Some(Lookup::StartsWith));
        assert_eq!(p.lookup(false), Some(Lookup::IStartsWith));
        assert_eq!(Pattern::parse("x").lookup(false), None);
    }
}
