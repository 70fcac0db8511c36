//! Column introspection and SQL type classification.
//!
//! Column metadata is read through an injected query executor; this module
//! only builds the catalog query and maps native types onto
//! [`SemanticType`]s.
//!
//! | Native type                                   | Semantic type |
//! |-----------------------------------------------|---------------|
//! | `int`, `bigint`, `serial`, ...                | Integer       |
//! | `real`, `double precision`, `numeric`, ...    | Float         |
//! | `bool`, `boolean`, MySQL `tinyint(1)`         | Boolean       |
//! | `char`, `varchar`, `text`, `uuid`, `enum(..)` | String        |
//! | `date`, `timestamp`, `datetime`, ...          | Timestamp     |
//! | anything else (`json`, `bytea`, arrays)       | unknown       |

use std::fmt;

use lucent_query::{FilterValue, Schema, SchemaSource, SearchResult, SemanticType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sql::{DatabaseType, SqlBuilder};

/// Information about a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Database-specific type name.
    pub db_type: String,
    /// Whether the column is nullable.
    pub nullable: bool,
}

impl ColumnInfo {
    /// Create column info.
    pub fn new(name: impl Into<String>, db_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            db_type: db_type.into(),
            nullable,
        }
    }
}

/// Build the catalog query listing `table`'s columns as
/// `(name, type, nullable)` rows.
pub fn columns_query(
    db_type: DatabaseType,
    table: &str,
    schema: Option<&str>,
) -> (String, Vec<FilterValue>) {
    let mut b = SqlBuilder::new(db_type);
    match db_type {
        DatabaseType::PostgreSQL => {
            b.push(
                "SELECT column_name, udt_name, is_nullable = 'YES' AS nullable \
                 FROM information_schema.columns WHERE table_schema = ",
            )
            .push_param(schema.unwrap_or("public"))
            .push(" AND table_name = ")
            .push_param(table)
            .push(" ORDER BY ordinal_position");
        }
        DatabaseType::MySQL => {
            b.push(
                "SELECT column_name, column_type, is_nullable = 'YES' AS nullable \
                 FROM information_schema.columns WHERE table_name = ",
            )
            .push_param(table);
            match schema {
                Some(schema) => b.push(" AND table_schema = ").push_param(schema),
                None => b.push(" AND table_schema = DATABASE()"),
            };
            b.push(" ORDER BY ordinal_position");
        }
        DatabaseType::SQLite => {
            b.push("SELECT name, type, \"notnull\" = 0 AS nullable FROM pragma_table_info(")
                .push_param(table)
                .push(") ORDER BY cid");
        }
    }
    b.build()
}

/// Classify a native column type.
pub fn normalize_type(db_type: DatabaseType, type_name: &str) -> Option<SemanticType> {
    let lower = type_name.trim().to_lowercase();
    match db_type {
        DatabaseType::PostgreSQL => normalize_postgres_type(&lower),
        DatabaseType::MySQL => normalize_mysql_type(&lower),
        DatabaseType::SQLite => normalize_sqlite_type(&lower),
    }
}

/// `varchar(255)` → `varchar`, `int unsigned` → `int`.
fn base_type(type_name: &str) -> &str {
    let end = type_name
        .find(|c: char| c == '(' || c == ' ')
        .unwrap_or(type_name.len());
    &type_name[..end]
}

fn normalize_postgres_type(type_name: &str) -> Option<SemanticType> {
    if type_name.ends_with("[]") || type_name.starts_with('_') {
        return None;
    }
    Some(match type_name {
        "int2" | "smallint" | "smallserial" | "int4" | "integer" | "int" | "serial" | "int8"
        | "bigint" | "bigserial" => SemanticType::Integer,
        "real" | "float4" | "double precision" | "float8" | "numeric" | "decimal" | "money" => {
            SemanticType::Float
        }
        "bool" | "boolean" => SemanticType::Boolean,
        "text" | "varchar" | "character varying" | "char" | "character" | "bpchar" | "name"
        | "citext" | "uuid" => SemanticType::String,
        "timestamp" | "timestamp without time zone" | "timestamptz"
        | "timestamp with time zone" | "date" => SemanticType::Timestamp,
        t => match base_type(t) {
            "varchar" | "char" | "character" => SemanticType::String,
            "numeric" | "decimal" => SemanticType::Float,
            "timestamp" | "timestamptz" => SemanticType::Timestamp,
            _ => return None,
        },
    })
}

fn normalize_mysql_type(type_name: &str) -> Option<SemanticType> {
    if type_name.starts_with("tinyint(1)") {
        return Some(SemanticType::Boolean);
    }
    Some(match base_type(type_name) {
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "year" => {
            SemanticType::Integer
        }
        "float" | "double" | "real" | "decimal" | "numeric" => SemanticType::Float,
        "bit" | "bool" | "boolean" => SemanticType::Boolean,
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set" => {
            SemanticType::String
        }
        "date" | "datetime" | "timestamp" => SemanticType::Timestamp,
        _ => return None,
    })
}

/// SQLite has dynamic typing, so we map by affinity.
fn normalize_sqlite_type(type_name: &str) -> Option<SemanticType> {
    let t = type_name.to_uppercase();
    Some(if t.contains("BOOL") {
        SemanticType::Boolean
    } else if t.contains("INT") {
        SemanticType::Integer
    } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
        SemanticType::String
    } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") || t.contains("NUMERIC")
    {
        SemanticType::Float
    } else if t.contains("DATE") || t.contains("TIME") {
        SemanticType::Timestamp
    } else {
        return None;
    })
}

/// Build a [`Schema`] from column metadata. Nullable booleans become
/// [`SemanticType::NullableBoolean`].
pub fn schema_from_columns(
    db_type: DatabaseType,
    columns: impl IntoIterator<Item = ColumnInfo>,
) -> Schema {
    let mut schema = Schema::new();
    for column in columns {
        let semantic = match normalize_type(db_type, &column.db_type) {
            Some(SemanticType::Boolean) if column.nullable => Some(SemanticType::NullableBoolean),
            other => other,
        };
        schema.insert(column.name, semantic);
    }
    schema
}

/// Runs a catalog query and returns its rows as [`ColumnInfo`].
pub type ColumnFetcher =
    Box<dyn Fn(&str, &[FilterValue]) -> SearchResult<Vec<ColumnInfo>> + Send + Sync>;

/// [`SchemaSource`] reading a table's columns through a query executor.
pub struct SqlIntrospector {
    db_type: DatabaseType,
    table: String,
    schema: Option<String>,
    default_search_fields: Vec<String>,
    fetch: ColumnFetcher,
}

impl SqlIntrospector {
    /// Create an introspector for `table`.
    pub fn new(
        db_type: DatabaseType,
        table: impl Into<String>,
        fetch: impl Fn(&str, &[FilterValue]) -> SearchResult<Vec<ColumnInfo>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            db_type,
            table: table.into(),
            schema: None,
            default_search_fields: Vec::new(),
            fetch: Box::new(fetch),
        }
    }

    /// Restrict to a database schema (namespace).
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Columns searched by bare terms.
    pub fn default_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_search_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl SchemaSource for SqlIntrospector {
    fn introspect(&self) -> SearchResult<Schema> {
        let (sql, params) = columns_query(self.db_type, &self.table, self.schema.as_deref());
        let columns = (self.fetch)(&sql, &params)?;
        debug!(
            table = %self.table,
            db = self.db_type.name(),
            columns = columns.len(),
            "Introspected table"
        );
        Ok(schema_from_columns(self.db_type, columns)
            .default_search_fields(self.default_search_fields.iter().cloned()))
    }
}

impl fmt::Debug for SqlIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlIntrospector")
            .field("db_type", &self.db_type)
            .field("table", &self.table)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
