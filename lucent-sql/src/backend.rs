//! [`Backend`] implementation producing [`Filter`] trees.

use lucent_query::{Backend, FilterValue, Lookup, SearchResult};

use crate::error::SqlError;
use crate::filter::Filter;
use crate::sql::{DatabaseType, escape_like, wildcard_to_like};

/// Relational backend for one SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlBackend {
    db_type: DatabaseType,
}

impl SqlBackend {
    /// Create a backend for `db_type`.
    pub fn new(db_type: DatabaseType) -> Self {
        Self { db_type }
    }

    /// Create a PostgreSQL backend.
    pub fn postgres() -> Self {
        Self::new(DatabaseType::PostgreSQL)
    }

    /// Create a MySQL backend.
    pub fn mysql() -> Self {
        Self::new(DatabaseType::MySQL)
    }

    /// Create a SQLite backend.
    pub fn sqlite() -> Self {
        Self::new(DatabaseType::SQLite)
    }

    /// The dialect.
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Render a compiled filter for this backend's dialect.
    pub fn to_sql(&self, filter: &Filter) -> (String, Vec<FilterValue>) {
        filter.to_sql(self.db_type)
    }
}

fn validate_column(source: &str) -> Result<(), SqlError> {
    if source.is_empty() || source.contains('\0') || source.split('.').any(str::is_empty) {
        return Err(SqlError::InvalidColumn(source.to_string()));
    }
    Ok(())
}

fn like(column: &str, pattern: String, case_insensitive: bool) -> Filter {
    Filter::Like {
        column: column.to_string(),
        pattern,
        case_insensitive,
    }
}

impl Backend for SqlBackend {
    type Predicate = Filter;

    fn name(&self) -> &'static str {
        self.db_type.name()
    }

    fn lookup(&self, source: &str, lookup: Lookup, value: &FilterValue) -> SearchResult<Filter> {
        validate_column(source)?;
        let column = source.to_string();
        let text = || escape_like(&value.to_string());
        Ok(match lookup {
            Lookup::Exact => Filter::Equals(column, value.clone()),
            Lookup::IExact => Filter::IEquals(column, value.clone()),
            Lookup::Contains => like(source, format!("%{}%", text()), false),
            Lookup::IContains => like(source, format!("%{}%", text()), true),
            Lookup::StartsWith => like(source, format!("{}%", text()), false),
            Lookup::IStartsWith => like(source, format!("{}%", text()), true),
            Lookup::EndsWith => like(source, format!("%{}", text()), false),
            Lookup::IEndsWith => like(source, format!("%{}", text()), true),
            Lookup::Gt => Filter::Gt(column, value.clone()),
            Lookup::Gte => Filter::Gte(column, value.clone()),
            Lookup::Lt => Filter::Lt(column, value.clone()),
            Lookup::Lte => Filter::Lte(column, value.clone()),
            Lookup::Wildcard => like(source, wildcard_to_like(&value.to_string()), true),
            Lookup::Regex => Filter::Regex {
                column,
                pattern: value.to_string(),
                case_insensitive: true,
            },
        })
    }

    fn full_text(&self, sources: &[String], text: &str) -> SearchResult<Filter> {
        for source in sources {
            validate_column(source)?;
        }
        if self.db_type == DatabaseType::PostgreSQL {
            return Ok(Filter::FullText {
                columns: sources.to_vec(),
                text: text.to_string(),
            });
        }
        let pattern = format!("%{}%", escape_like(text));
        Ok(Filter::or(
            sources.iter().map(|source| like(source, pattern.clone(), true)),
        ))
    }

    fn and(&self, predicates: Vec<Filter>) -> Filter {
        Filter::and(predicates)
    }

    fn or(&self, predicates: Vec<Filter>) -> Filter {
        Filter::or(predicates)
    }

    fn not(&self, predicate: Filter) -> Filter {
        Filter::not(predicate)
    }

    fn match_all(&self) -> Filter {
        Filter::None
    }

    fn match_none(&self) -> Filter {
        Filter::Never
    }
}
