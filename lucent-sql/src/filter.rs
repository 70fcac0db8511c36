//! Filter types for building WHERE clauses.

use lucent_query::FilterValue;

use crate::sql::{DatabaseType, SqlBuilder};

/// A complete filter that can be converted to SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// No filter (always true).
    None,
    /// Never true.
    Never,

    /// Equals comparison; a null value renders as `IS NULL`.
    Equals(String, FilterValue),
    /// Case-insensitive equality.
    IEquals(String, FilterValue),

    /// Less than comparison.
    Lt(String, FilterValue),
    /// Less than or equal comparison.
    Lte(String, FilterValue),
    /// Greater than comparison.
    Gt(String, FilterValue),
    /// Greater than or equal comparison.
    Gte(String, FilterValue),

    /// `LIKE` against an already escaped pattern.
    Like {
        column: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// Regular expression match.
    Regex {
        column: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// Full-text match over several columns.
    FullText { columns: Vec<String>, text: String },

    /// Is null check.
    IsNull(String),

    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
    /// Logical NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn none() -> Self {
        Self::None
    }

    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an AND filter. Match-all members are dropped.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.pop().unwrap_or(Self::None),
            _ => Self::And(filters),
        }
    }

    /// Create an OR filter. A match-all member makes the whole filter
    /// match-all.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().collect();
        if filters.is_empty() || filters.iter().any(Filter::is_none) {
            return Self::None;
        }
        match filters.len() {
            1 => filters.pop().unwrap_or(Self::None),
            _ => Self::Or(filters),
        }
    }

    /// Create a NOT filter.
    pub fn not(filter: Filter) -> Self {
        match filter {
            Self::None => Self::Never,
            Self::Never => Self::None,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Generate SQL for this filter with parameter placeholders.
    /// Returns (sql, params) where params are the values to bind.
    pub fn to_sql(&self, db_type: DatabaseType) -> (String, Vec<FilterValue>) {
        let mut builder = SqlBuilder::new(db_type);
        self.write(&mut builder);
        builder.build()
    }

    /// Append this filter to a builder, continuing its parameter numbering.
    pub fn write(&self, b: &mut SqlBuilder) {
        let db = b.db_type();
        match self {
            Self::None => {
                b.push("TRUE");
            }
            Self::Never => {
                b.push("FALSE");
            }

            Self::Equals(col, val) => {
                b.push_identifier(col);
                if val.is_null() {
                    b.push(" IS NULL");
                } else {
                    b.push(" = ").push_param(val.clone());
                }
            }
            Self::IEquals(col, val) => match val {
                FilterValue::String(_) => {
                    b.push("LOWER(")
                        .push_identifier(col)
                        .push(") = LOWER(")
                        .push_param(val.clone())
                        .push(")");
                }
                other => Self::Equals(col.clone(), other.clone()).write(b),
            },

            Self::Lt(col, val) => comparison(b, col, "<", val),
            Self::Lte(col, val) => comparison(b, col, "<=", val),
            Self::Gt(col, val) => comparison(b, col, ">", val),
            Self::Gte(col, val) => comparison(b, col, ">=", val),

            Self::Like {
                column,
                pattern,
                case_insensitive,
            } => {
                match (db, *case_insensitive) {
                    (DatabaseType::PostgreSQL, true) => {
                        b.push_identifier(column).push(" ILIKE ").push_param(pattern.as_str());
                    }
                    (_, true) => {
                        b.push("LOWER(")
                            .push_identifier(column)
                            .push(") LIKE LOWER(")
                            .push_param(pattern.as_str())
                            .push(")");
                    }
                    (DatabaseType::MySQL, false) => {
                        b.push_identifier(column)
                            .push(" LIKE BINARY ")
                            .push_param(pattern.as_str());
                    }
                    (_, false) => {
                        b.push_identifier(column).push(" LIKE ").push_param(pattern.as_str());
                    }
                }
                if db == DatabaseType::SQLite {
                    b.push(" ESCAPE '\\'");
                }
            }
            Self::Regex {
                column,
                pattern,
                case_insensitive,
            } => match db {
                DatabaseType::PostgreSQL => {
                    let op = if *case_insensitive { " ~* " } else { " ~ " };
                    b.push_identifier(column).push(op).push_param(pattern.as_str());
                }
                DatabaseType::MySQL => {
                    let flags = if *case_insensitive { "'i'" } else { "'c'" };
                    b.push("REGEXP_LIKE(")
                        .push_identifier(column)
                        .push(", ")
                        .push_param(pattern.as_str())
                        .push(", ")
                        .push(flags)
                        .push(")");
                }
                DatabaseType::SQLite => {
                    b.push_identifier(column).push(" REGEXP ").push_param(pattern.as_str());
                }
            },
            Self::FullText { columns, text } => {
                b.push("to_tsvector('simple', concat_ws(' '");
                for column in columns {
                    b.push(", ").push_identifier(column);
                }
                b.push(")) @@ plainto_tsquery('simple', ")
                    .push_param(text.as_str())
                    .push(")");
            }

            Self::IsNull(col) => {
                b.push_identifier(col).push(" IS NULL");
            }

            Self::And(filters) => join(b, filters, " AND ", "TRUE"),
            Self::Or(filters) => join(b, filters, " OR ", "FALSE"),
            Self::Not(filter) => {
                b.push("NOT (");
                filter.write(b);
                b.push(")");
            }
        }
    }
}

fn comparison(b: &mut SqlBuilder, col: &str, op: &str, val: &FilterValue) {
    b.push_identifier(col)
        .push(" ")
        .push(op)
        .push(" ")
        .push_param(val.clone());
}

fn join(b: &mut SqlBuilder, filters: &[Filter], sep: &str, empty: &str) {
    if filters.is_empty() {
        b.push(empty);
        return;
    }
    b.push("(");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            b.push(sep);
        }
        filter.write(b);
    }
    b.push(")");
}

impl Default for Filter {
    fn default() -> Self {
        Self::None
    }
}
