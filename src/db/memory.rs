//! In-memory landing store
//!
//! Mirrors the behaviour the loaders rely on from PostgreSQL: catalog order, per-call
//! transactions, unknown columns rejected, truncation. Every executed statement is kept
//! so callers can inspect the generated SQL.

use crate::db::statement::InsertStatement;
use crate::db::store::{ColumnInfo, LandingStore};
use crate::db::table::TableName;
use crate::db::value::SqlValue;
use crate::error::{LandingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One stored row keyed by column name; absent columns are at their default
pub type StoredRow = HashMap<String, SqlValue>;

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<ColumnInfo>,
    rows: Vec<StoredRow>,
    truncations: usize,
    fail_after_rows: Option<usize>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    statements: Vec<String>,
    catalog_unavailable: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryStore::create_table`]
    pub fn with_table(self, table: &str, columns: &[&str]) -> Self {
        self.create_table(table, columns);
        self
    }

    pub fn create_table(&self, table: &str, columns: &[&str]) {
        let columns = columns.iter().map(|c| ColumnInfo::untyped(*c)).collect();
        self.create_typed_table(table, columns);
    }

    pub fn create_typed_table(&self, table: &str, columns: Vec<ColumnInfo>) {
        self.state().tables.insert(
            table.to_string(),
            MemoryTable {
                columns,
                ..MemoryTable::default()
            },
        );
    }

    /// Pre-populate rows, bypassing statements
    pub fn seed_rows(&self, table: &str, rows: Vec<StoredRow>) {
        if let Some(t) = self.state().tables.get_mut(table) {
            t.rows.extend(rows);
        }
    }

    pub fn rows(&self, table: &str) -> Vec<StoredRow> {
        self.state()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn truncations(&self, table: &str) -> usize {
        self.state().tables.get(table).map(|t| t.truncations).unwrap_or(0)
    }

    /// SQL of every statement executed so far, in order
    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    /// Make the insert of row `n + 1` into `table` fail
    pub fn fail_after_rows(&self, table: &str, n: usize) {
        if let Some(t) = self.state().tables.get_mut(table) {
            t.fail_after_rows = Some(n);
        }
    }

    /// Make every catalog query fail
    pub fn make_catalog_unavailable(&self) {
        self.state().catalog_unavailable = true;
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn table_mut<'s>(state: &'s mut MemoryState, table: &TableName) -> Result<&'s mut MemoryTable> {
        state
            .tables
            .get_mut(&table.to_string())
            .ok_or_else(|| LandingError::Store(format!("relation \"{}\" does not exist", table)))
    }

    /// Validate and build rows without touching the table
    fn stage_rows(
        target: &MemoryTable,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
    ) -> Result<Vec<StoredRow>> {
        for column in statement.columns() {
            if !target.columns.iter().any(|c| c.name == column.name) {
                return Err(LandingError::Store(format!(
                    "column \"{}\" of relation \"{}\" does not exist",
                    column.name,
                    statement.table()
                )));
            }
        }

        let mut staged = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if target.fail_after_rows.is_some_and(|limit| idx >= limit) {
                return Err(LandingError::Store(format!(
                    "simulated failure inserting row {} into {}",
                    idx + 1,
                    statement.table()
                )));
            }
            if row.len() != statement.columns().len() {
                return Err(LandingError::Store(format!(
                    "row has {} values for {} columns",
                    row.len(),
                    statement.columns().len()
                )));
            }
            staged.push(
                statement
                    .column_names()
                    .into_iter()
                    .map(str::to_string)
                    .zip(row.iter().cloned())
                    .collect(),
            );
        }
        Ok(staged)
    }
}

#[async_trait]
impl LandingStore for MemoryStore {
    async fn table_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>> {
        let state = self.state();
        if state.catalog_unavailable {
            return Err(LandingError::Store("catalog query failed".to_string()));
        }
        Ok(state
            .tables
            .get(&table.to_string())
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn insert_rows(
        &self,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
        truncate_first: bool,
    ) -> Result<u64> {
        let mut state = self.state();
        if truncate_first {
            state
                .statements
                .push(format!("TRUNCATE TABLE {}", statement.table().quoted()));
        }
        state.statements.push(statement.render(1));
        if rows.is_empty() && !truncate_first {
            return Ok(0);
        }

        let target = Self::table_mut(&mut state, statement.table())?;
        let staged = Self::stage_rows(target, statement, rows)?;
        if truncate_first {
            target.rows.clear();
            target.truncations += 1;
        }
        let inserted = staged.len() as u64;
        target.rows.extend(staged);
        Ok(inserted)
    }

    async fn truncate(&self, table: &TableName) -> Result<()> {
        let mut state = self.state();
        state.statements.push(format!("TRUNCATE TABLE {}", table.quoted()));
        let target = Self::table_mut(&mut state, table)?;
        target.rows.clear();
        target.truncations += 1;
        Ok(())
    }

    async fn append_rows(&self, statement: &InsertStatement, rows: &[Vec<SqlValue>]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut state = self.state();
        state.statements.push(statement.render(rows.len()));
        let target = Self::table_mut(&mut state, statement.table())?;
        let staged = Self::stage_rows(target, statement, rows)?;
        let appended = staged.len() as u64;
        target.rows.extend(staged);
        Ok(appended)
    }

    async fn replace_rows(&self, statement: &InsertStatement, rows: &[Vec<SqlValue>]) -> Result<u64> {
        let mut state = self.state();
        state
            .statements
            .push(format!("TRUNCATE TABLE {}", statement.table().quoted()));
        if !rows.is_empty() {
            state.statements.push(statement.render(rows.len()));
        }

        let target = Self::table_mut(&mut state, statement.table())?;
        let staged = Self::stage_rows(target, statement, rows)?;
        target.rows.clear();
        target.truncations += 1;
        let appended = staged.len() as u64;
        target.rows.extend(staged);
        Ok(appended)
    }
}
