//! Landing store trait - the database collaborator of the loaders

use crate::db::statement::InsertStatement;
use crate::db::table::{quote_ident, TableName};
use crate::db::value::SqlValue;
use crate::error::Result;
use async_trait::async_trait;

/// One column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,

    /// Catalog type name (`udt_name`), used to cast text parameters
    pub udt_name: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, udt_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            udt_name: udt_name.map(str::to_string),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            udt_name: None,
        }
    }

    /// `$n` placeholder, cast to the column type when it is known
    pub fn placeholder(&self, position: usize) -> String {
        match self.udt_name.as_deref() {
            Some(udt) if !udt.is_empty() => format!("${}::{}", position, quote_ident(udt)),
            _ => format!("${}", position),
        }
    }
}

/// Destination store for landing tables.
///
/// Implementations:
/// - PostgresStore: sqlx-backed PostgreSQL session
/// - MemoryStore: in-process tables for tests and dry runs
#[async_trait]
pub trait LandingStore: Send + Sync {
    /// Columns of `table` in ordinal order. Empty when the table does not exist.
    async fn table_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>>;

    /// Execute `statement` once per row inside one transaction.
    /// Either every row is stored or none is. With `truncate_first` the table is
    /// emptied inside the same transaction.
    async fn insert_rows(
        &self,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
        truncate_first: bool,
    ) -> Result<u64>;

    async fn truncate(&self, table: &TableName) -> Result<()>;

    /// Multi-row append of `rows`, all or nothing
    async fn append_rows(&self, statement: &InsertStatement, rows: &[Vec<SqlValue>]) -> Result<u64>;

    /// Truncate and append inside one transaction
    async fn replace_rows(&self, statement: &InsertStatement, rows: &[Vec<SqlValue>]) -> Result<u64>;

    /// Release the session, if any
    async fn close(&self) {}
}
