//! Destination schema definitions
//!
//! Twelve append-only tables, one per record shape, created inside a single
//! namespace (a SQL schema, `pulse` by default). The SQL emitted here works
//! unchanged on DuckDB and PostgreSQL; only parameter placeholders differ.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DatabaseError, DatabaseResult};
use crate::models::{Category, Scope, Shape};

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "pulse";

static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("Invalid regex"));

/// SQL type of a destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    SmallInt,
    BigInt,
    Double,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "VARCHAR",
            ColumnType::Integer => "INTEGER",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
        }
    }
}

/// A single destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
}

const fn col(name: &'static str, column_type: ColumnType) -> ColumnDef {
    ColumnDef { name, column_type }
}

/// Parameter placeholder style of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` (DuckDB)
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
}

impl Placeholder {
    /// Placeholder for the 1-based parameter `n`
    pub fn nth(&self, n: usize) -> String {
        match self {
            Placeholder::Question => "?".to_string(),
            Placeholder::Dollar => format!("${}", n),
        }
    }

    /// Comma separated list of `count` placeholders
    pub fn list(&self, count: usize) -> String {
        (1..=count)
            .map(|n| self.nth(n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Destination schema helper
pub struct DestinationSchema;

impl DestinationSchema {
    /// Reject namespaces that are not plain lower-case identifiers
    pub fn validate_namespace(namespace: &str) -> DatabaseResult<()> {
        if NAMESPACE_RE.is_match(namespace) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidInput(format!(
                "Namespace must be a lower-case SQL identifier: {:?}",
                namespace
            )))
        }
    }

    /// Columns of a shape's table, in insert order
    pub fn columns(shape: Shape) -> Vec<ColumnDef> {
        use ColumnType::*;

        let mut columns = vec![col("country", Text)];
        if shape.is_sub_national() {
            columns.push(col("state", Text));
        }
        columns.push(col("year", Integer));
        columns.push(col("quarter", SmallInt));

        // Map tables name their unit after what it is one level down
        let unit = if shape.is_sub_national() {
            "district"
        } else {
            "state"
        };

        match (shape.category, shape.scope) {
            (Category::Aggregated, Scope::Transaction) => columns.extend([
                col("transaction_type", Text),
                col("transaction_count", BigInt),
                col("transaction_amount", Double),
            ]),
            (Category::Aggregated, Scope::User) => columns.extend([
                col("brand_name", Text),
                col("user_count", BigInt),
                col("percentage", Double),
            ]),
            (Category::Map, Scope::Transaction) => columns.extend([
                col(unit, Text),
                col("transaction_count", BigInt),
                col("transaction_amount", Double),
            ]),
            (Category::Map, Scope::User) => columns.extend([
                col(unit, Text),
                col("registered_users", BigInt),
                col("app_opens", BigInt),
            ]),
            (Category::Top, Scope::Transaction) => columns.extend([
                col("entity_kind", Text),
                col("entity_name", Text),
                col("transaction_count", BigInt),
                col("transaction_amount", Double),
            ]),
            (Category::Top, Scope::User) => columns.extend([
                col("entity_kind", Text),
                col("entity_name", Text),
                col("registered_users", BigInt),
            ]),
        }

        columns
    }

    /// Fully qualified table name, e.g. `pulse.agg_trans_country`
    pub fn qualified(namespace: &str, shape: Shape) -> String {
        format!("{}.{}", namespace, shape.table_name())
    }

    pub fn create_namespace_sql(namespace: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {};", namespace)
    }

    pub fn create_table_sql(namespace: &str, shape: Shape) -> String {
        let columns: Vec<String> = Self::columns(shape)
            .iter()
            .map(|c| format!("    {} {} NOT NULL", c.name, c.column_type.sql()))
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            Self::qualified(namespace, shape),
            columns.join(",\n")
        )
    }

    /// Namespace plus all twelve tables, safe to run repeatedly
    pub fn ensure_schema_sql(namespace: &str) -> String {
        let mut statements = vec![Self::create_namespace_sql(namespace)];
        statements.extend(
            Shape::ALL
                .into_iter()
                .map(|shape| Self::create_table_sql(namespace, shape)),
        );
        statements.join("\n\n")
    }

    pub fn insert_sql(namespace: &str, shape: Shape, placeholder: Placeholder) -> String {
        let columns = Self::columns(shape);
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Self::qualified(namespace, shape),
            names.join(", "),
            placeholder.list(columns.len())
        )
    }

    /// Counts matching tables; `0` when the table has not been created yet
    pub fn table_exists_sql(namespace: &str, shape: Shape) -> String {
        format!(
            "SELECT COUNT(*) AS table_count FROM information_schema.tables \
             WHERE table_schema = '{}' AND table_name = '{}'",
            namespace,
            shape.table_name()
        )
    }

    /// Returns one row when the table holds any data
    pub fn has_rows_sql(namespace: &str, shape: Shape) -> String {
        format!(
            "SELECT 1 AS present FROM {} LIMIT 1",
            Self::qualified(namespace, shape)
        )
    }

    pub fn count_sql(namespace: &str, shape: Shape) -> String {
        format!(
            "SELECT COUNT(*) AS row_count FROM {}",
            Self::qualified(namespace, shape)
        )
    }
}
