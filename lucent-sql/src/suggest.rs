//! `SELECT DISTINCT` value queries for suggestions.

use std::fmt;

use indexmap::IndexSet;
use lucent_query::{FilterValue, SearchResult, ValueSource};
use tracing::debug;

use crate::sql::{DatabaseType, SqlBuilder, escape_like};

/// Build the query listing up to `limit` distinct values of `source` in
/// `table` that contain `prefix`, ignoring case.
///
/// Values are cast to text so numeric columns can be suggested too.
pub fn distinct_values_query(
    db_type: DatabaseType,
    table: &str,
    source: &str,
    prefix: &str,
    limit: usize,
) -> (String, Vec<FilterValue>) {
    let mut b = SqlBuilder::new(db_type);
    let text_type = match db_type {
        DatabaseType::MySQL => "CHAR",
        DatabaseType::PostgreSQL | DatabaseType::SQLite => "TEXT",
    };

    b.push("SELECT DISTINCT CAST(")
        .push_identifier(source)
        .push(" AS ")
        .push(text_type)
        .push(") AS value FROM ")
        .push_identifier(table)
        .push(" WHERE ")
        .push_identifier(source)
        .push(" IS NOT NULL");

    if !prefix.is_empty() {
        let pattern = format!("%{}%", escape_like(prefix));
        b.push(" AND ");
        match db_type {
            DatabaseType::PostgreSQL => {
                b.push("CAST(")
                    .push_identifier(source)
                    .push(" AS TEXT) ILIKE ")
                    .push_param(pattern);
            }
            DatabaseType::MySQL | DatabaseType::SQLite => {
                b.push("LOWER(CAST(")
                    .push_identifier(source)
                    .push(" AS ")
                    .push(text_type)
                    .push(")) LIKE LOWER(")
                    .push_param(pattern)
                    .push(")");
                if db_type == DatabaseType::SQLite {
                    b.push(" ESCAPE '\\'");
                }
            }
        }
    }

    b.push(" ORDER BY value LIMIT ").push(limit.to_string());
    b.build()
}

/// Runs a value query and returns the first column of every row.
pub type ValueExecutor =
    Box<dyn Fn(&str, &[FilterValue]) -> SearchResult<Vec<String>> + Send + Sync>;

/// [`ValueSource`] issuing one distinct-value query per source column.
pub struct SqlValueSource {
    db_type: DatabaseType,
    table: String,
    execute: ValueExecutor,
}

impl SqlValueSource {
    /// Create a value source over `table`.
    pub fn new(
        db_type: DatabaseType,
        table: impl Into<String>,
        execute: impl Fn(&str, &[FilterValue]) -> SearchResult<Vec<String>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            db_type,
            table: table.into(),
            execute: Box::new(execute),
        }
    }
}

impl ValueSource for SqlValueSource {
    fn fetch_values(
        &self,
        sources: &[String],
        prefix: &str,
        limit: usize,
    ) -> SearchResult<Vec<String>> {
        let mut values = IndexSet::new();
        for source in sources {
            if values.len() >= limit {
                break;
            }
            let (sql, params) =
                distinct_values_query(self.db_type, &self.table, source, prefix, limit - values.len());
            let rows = (self.execute)(&sql, &params)?;
            debug!(table = %self.table, source = %source, rows = rows.len(), "Fetched values");
            values.extend(rows);
        }
        Ok(values.into_iter().take(limit).collect())
    }
}

impl fmt::Debug for SqlValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlValueSource")
            .field("db_type", &self.db_type)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_postgres_query() {
        let (sql, params) =
            distinct_values_query(DatabaseType::PostgreSQL, "user", "email", "ann_", 10);
        assert_eq!(
            sql,
            "SELECT DISTINCT CAST(email AS TEXT) AS value FROM \"user\" \
             WHERE email IS NOT NULL AND CAST(email AS TEXT) ILIKE $1 \
             ORDER BY value LIMIT 10"
        );
        assert_eq!(params, vec![FilterValue::from("%ann\\_%")]);
    }

    #[test]
    fn test_empty_prefix_has_no_like() {
        let (sql, params) = distinct_values_query(DatabaseType::MySQL, "users", "city", "", 5);
        assert!(!sql.contains("LIKE"));
        assert!(sql.ends_with("LIMIT 5"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_value_source_merges_sources_up_to_limit() {
        let source = SqlValueSource::new(DatabaseType::SQLite, "people", |sql, _params| {
            Ok(if sql.contains("CAST(first AS TEXT)") {
                vec!["ann".to_string(), "bob".to_string()]
            } else {
                vec!["bob".to_string(), "cy".to_string(), "dee".to_string()]
            })
        });
        let values = source
            .fetch_values(&["first".to_string(), "last".to_string()], "", 3)
            .unwrap();
        assert_eq!(values, vec!["ann", "bob", "cy"]);
    }
}
