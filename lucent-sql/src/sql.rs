//! SQL generation utilities.

use lucent_query::FilterValue;
use serde::{Deserialize, Serialize};

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    // Reserved keywords or names with special characters need quoting
    let reserved = [
        "user", "order", "group", "select", "from", "where", "table", "index", "key", "primary",
        "foreign", "check", "default", "null", "not", "and", "or", "in", "is", "like", "between",
        "case", "when", "then", "else", "end", "as", "on", "join", "limit", "offset", "union",
        "all", "distinct", "having", "values", "set",
    ];

    if reserved.contains(&name.to_lowercase().as_str()) {
        return true;
    }

    name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit())
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape `%`, `_` and `\` so a value matches literally inside `LIKE`.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Turn a `*` wildcard pattern into a `LIKE` pattern. `\*` stays a
/// literal star.
pub fn wildcard_to_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push('*');
            }
            '*' => out.push('%'),
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// PostgreSQL uses $1, $2, etc.
    #[default]
    PostgreSQL,
    /// MySQL uses ?, ?, etc.
    MySQL,
    /// SQLite uses ?, ?, etc.
    SQLite,
}

impl DatabaseType {
    /// Get the parameter placeholder for this database type.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", index),
            Self::MySQL | Self::SQLite => "?".to_string(),
        }
    }

    /// Quote a single identifier, always.
    pub fn escape_identifier(&self, name: &str) -> String {
        match self {
            Self::MySQL => format!("`{}`", name.replace('`', "``")),
            Self::PostgreSQL | Self::SQLite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Quote a possibly dotted column path, segment by segment, where needed.
    pub fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| {
                if needs_quoting(segment) {
                    self.escape_identifier(segment)
                } else {
                    segment.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Dialect name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite",
        }
    }
}

/// A SQL builder collecting text and bound parameters.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    db_type: DatabaseType,
    sql: String,
    params: Vec<FilterValue>,
}

impl SqlBuilder {
    /// Create a new SQL builder.
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// The dialect being written.
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Push a literal SQL string.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        self.sql.push_str(sql.as_ref());
        self
    }

    /// Push a placeholder bound to `value`.
    pub fn push_param(&mut self, value: impl Into<FilterValue>) -> &mut Self {
        self.params.push(value.into());
        let placeholder = self.db_type.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Push an identifier (properly quoted if needed).
    pub fn push_identifier(&mut self, name: &str) -> &mut Self {
        let quoted = self.db_type.quote_identifier(name);
        self.sql.push_str(&quoted);
        self
    }

    /// Build the final SQL string and parameters.
    pub fn build(self) -> (String, Vec<FilterValue>) {
        (self.sql, self.params)
    }

    /// Get the current SQL string (without consuming).
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the current parameters.
    pub fn params(&self) -> &[FilterValue] {
        &self.params
    }
}

impl Default for SqlBuilder {
    fn default() -> Self {
        Self::new(DatabaseType::PostgreSQL)
    }
}
