//! Insert statements rendered from a column list resolved at call time

use crate::db::store::ColumnInfo;
use crate::db::table::{quote_ident, TableName};

/// PostgreSQL caps bind parameters per statement at 65535
pub const MAX_BIND_PARAMS: usize = 65_535;

/// `INSERT INTO <table> (<columns>) VALUES ...` for a fixed column list
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    table: TableName,
    columns: Vec<ColumnInfo>,
}

impl InsertStatement {
    pub fn new(table: TableName, columns: Vec<ColumnInfo>) -> Self {
        Self { table, columns }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Rows that fit in one statement without exceeding the bind limit
    pub fn max_rows_per_statement(&self) -> usize {
        (MAX_BIND_PARAMS / self.columns.len().max(1)).max(1)
    }

    /// Render a statement with `row_count` value tuples.
    /// Placeholders are numbered row-major, matching a flattened bind order.
    pub fn render(&self, row_count: usize) -> String {
        let column_list = self
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut tuples = Vec::with_capacity(row_count);
        let mut position = 1;
        for _ in 0..row_count {
            let mut slots = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                slots.push(column.placeholder(position));
                position += 1;
            }
            tuples.push(format!("({})", slots.join(", ")));
        }

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table.quoted(),
            column_list,
            tuples.join(", ")
        )
    }
}
