//! Schema Inspector - column discovery against the destination catalog

use crate::db::{ColumnInfo, LandingStore, TableName};
use crate::ingestion::DOCUMENT_COLUMN;
use tracing::{error, info};

/// How rows reach a destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionMode {
    /// The table has a generic document column; every record is stored as one JSON value
    Document,
    /// Records are spread over matching columns
    Structured,
}

/// Columns of one destination table, fetched once per load call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn mode(&self) -> IngestionMode {
        if self.contains(DOCUMENT_COLUMN) {
            IngestionMode::Document
        } else {
            IngestionMode::Structured
        }
    }
}

pub struct SchemaInspector<'a> {
    store: &'a dyn LandingStore,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(store: &'a dyn LandingStore) -> Self {
        Self { store }
    }

    /// Fetch the table's columns. A missing table or a failed catalog query
    /// both come back as an empty schema.
    pub async fn inspect(&self, table: &TableName) -> TableSchema {
        match self.store.table_columns(table).await {
            Ok(columns) => {
                let schema = TableSchema::new(columns);
                info!("Found columns for {}: {:?}", table, schema.column_names());
                schema
            }
            Err(e) => {
                error!("Error getting table columns for {}: {}", table, e);
                TableSchema::default()
            }
        }
    }

    pub async fn columns_of(&self, table: &TableName) -> Vec<String> {
        self.inspect(table).await.column_names()
    }
}
