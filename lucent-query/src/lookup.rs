//! Backend-neutral comparison verbs and operator→lookup tables.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::ast::Operator;
use crate::error::SearchError;

/// A comparison verb. Backends translate lookups into their native form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// Exact, case-sensitive equality (a `term` query on search indexes).
    Exact,
    /// Case-insensitive equality.
    IExact,
    /// Substring, case-sensitive.
    Contains,
    /// Substring, case-insensitive.
    IContains,
    /// Prefix, case-sensitive.
    StartsWith,
    /// Prefix, case-insensitive.
    IStartsWith,
    /// Suffix, case-sensitive.
    EndsWith,
    /// Suffix, case-insensitive.
    IEndsWith,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Verbatim wildcard pattern where `*` matches any run of characters.
    Wildcard,
    /// Case-insensitive regular expression.
    Regex,
}

impl Lookup {
    /// The lookup's canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Wildcard => "wildcard",
            Self::Regex => "iregex",
        }
    }

    /// Check if this is a range comparison.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// Check if this lookup ignores case.
    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Self::IExact | Self::IContains | Self::IStartsWith | Self::IEndsWith | Self::Regex
        )
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookup {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "exact" | "term" => Self::Exact,
            "iexact" | "match" => Self::IExact,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "istartswith" => Self::IStartsWith,
            "endswith" => Self::EndsWith,
            "iendswith" => Self::IEndsWith,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "wildcard" => Self::Wildcard,
            "iregex" | "regex" => Self::Regex,
            other => return Err(SearchError::config(format!("unknown lookup `{}`", other))),
        })
    }
}

/// Operator→lookup mapping with a fallback default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    default: Lookup,
    operators: HashMap<Operator, Lookup>,
}

impl LookupTable {
    /// Create a table where every operator maps to `default`.
    pub fn new(default: Lookup) -> Self {
        Self {
            default,
            operators: HashMap::new(),
        }
    }

    /// Map an operator to a lookup.
    pub fn with(mut self, operator: Operator, lookup: Lookup) -> Self {
        self.operators.insert(operator, lookup);
        self
    }

    /// Map the four range operators to their range lookups.
    pub fn with_ranges(self) -> Self {
        self.with(Operator::Gt, Lookup::Gt)
            .with(Operator::Gte, Lookup::Gte)
            .with(Operator::Lt, Lookup::Lt)
            .with(Operator::Lte, Lookup::Lte)
    }

    /// The fallback lookup.
    pub fn default_lookup(&self) -> Lookup {
        self.default
    }

    /// The explicit mapping for `operator`, if any.
    pub fn explicit(&self, operator: Operator) -> Option<Lookup> {
        self.operators.get(&operator).copied()
    }

    /// Resolve `operator`, falling back to the default lookup.
    pub fn get(&self, operator: Operator) -> Lookup {
        self.explicit(operator).unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trip_names() {
        for lookup in [Lookup::Exact, Lookup::IContains, Lookup::Gte, Lookup::Wildcard] {
            assert_eq!(lookup.as_str().parse::<Lookup>().unwrap(), lookup);
        }
        assert!("nope".parse::<Lookup>().is_err());
    }

    #[test]
    fn test_table_fallback() {
        let table = LookupTable::new(Lookup::IExact).with(Operator::Eq, Lookup::IContains);
        assert_eq!(table.get(Operator::Eq), Lookup::IContains);
        assert_eq!(table.get(Operator::Gt), Lookup::IExact);
        assert_eq!(table.explicit(Operator::Gt), None);
    }
}
