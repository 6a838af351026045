//! Tabular Loader - structured rows into matching columns, or documents for
//! schema-flexible tables

use crate::db::{ColumnInfo, InsertStatement, LandingStore, SqlValue, TableName};
use crate::error::{LandingError, Result};
use crate::ingestion::document_loader::{DocumentLoader, DocumentMetadata};
use crate::ingestion::normalize::to_snake_case;
use crate::ingestion::schema_inspector::{IngestionMode, SchemaInspector, TableSchema};
use crate::ingestion::table::Table;
use crate::ingestion::{LoadOptions, LOADED_AT_COLUMN, SOURCE_FILE_COLUMN};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Which source columns land where, plus the metadata values appended to every row
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPlan {
    statement: InsertStatement,
    source_indices: Vec<usize>,
    metadata_values: Vec<SqlValue>,
    dropped: Vec<String>,
}

impl StructuredPlan {
    pub fn build(
        table: &Table,
        target: &TableName,
        schema: &TableSchema,
        source_id: Option<&str>,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        let mut metadata_columns = Vec::new();
        let mut metadata_values = Vec::new();
        if let Some(info) = schema.column(LOADED_AT_COLUMN) {
            metadata_columns.push(info.clone());
            metadata_values.push(SqlValue::Timestamp(loaded_at));
        }
        if let (Some(info), Some(source_id)) = (schema.column(SOURCE_FILE_COLUMN), source_id) {
            metadata_columns.push(info.clone());
            metadata_values.push(SqlValue::Text(source_id.to_string()));
        }

        // metadata values replace source columns of the same name
        let mut taken: HashSet<String> = metadata_columns.iter().map(|c| c.name.clone()).collect();
        let mut columns: Vec<ColumnInfo> = Vec::new();
        let mut source_indices = Vec::new();
        let mut dropped = Vec::new();

        for (idx, original) in table.columns().iter().enumerate() {
            let normalized = to_snake_case(original);
            match schema.column(&normalized) {
                Some(info) if taken.insert(normalized.clone()) => {
                    columns.push(info.clone());
                    source_indices.push(idx);
                }
                Some(_) => {
                    if !metadata_columns.iter().any(|c| c.name == normalized) {
                        warn!("Column '{}' normalizes to '{}' which is already mapped; keeping the first", original, normalized);
                    }
                    dropped.push(original.clone());
                }
                None => dropped.push(original.clone()),
            }
        }

        columns.extend(metadata_columns);

        Self {
            statement: InsertStatement::new(target.clone(), columns),
            source_indices,
            metadata_values,
            dropped,
        }
    }

    pub fn statement(&self) -> &InsertStatement {
        &self.statement
    }

    /// Source columns with no destination counterpart
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Neither a source column nor a metadata column lands anywhere
    pub fn has_no_columns(&self) -> bool {
        self.statement.columns().is_empty()
    }

    pub fn rows(&self, table: &Table) -> Vec<Vec<SqlValue>> {
        table
            .rows()
            .iter()
            .map(|row| {
                let mut values: Vec<SqlValue> = self
                    .source_indices
                    .iter()
                    .map(|&idx| row.get(idx).map(SqlValue::from_json_cell).unwrap_or(SqlValue::Null))
                    .collect();
                values.extend(self.metadata_values.iter().cloned());
                values
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct TabularLoader {
    store: Arc<dyn LandingStore>,
    documents: DocumentLoader,
    options: LoadOptions,
}

impl TabularLoader {
    pub fn new(store: Arc<dyn LandingStore>) -> Self {
        Self::with_options(store, LoadOptions::default())
    }

    pub fn with_options(store: Arc<dyn LandingStore>, options: LoadOptions) -> Self {
        let documents = DocumentLoader::with_options(Arc::clone(&store), options);
        Self {
            store,
            documents,
            options,
        }
    }

    /// Load `table` into `table_name`. Failures are logged and reported as `false`.
    pub async fn load(&self, table: &Table, table_name: &str, source_id: Option<&str>) -> bool {
        let target = TableName::parse(table_name);
        match self.try_load(table, &target, source_id).await {
            Ok(loaded) => {
                info!("Successfully loaded {} records to {}", loaded, target);
                true
            }
            Err(e) => {
                error!("Failed to load data to {}: {}", target, e);
                false
            }
        }
    }

    pub async fn try_load(&self, table: &Table, target: &TableName, source_id: Option<&str>) -> Result<u64> {
        let schema = SchemaInspector::new(self.store.as_ref()).inspect(target).await;

        if schema.mode() == IngestionMode::Document {
            info!("{} is schema-flexible; storing {} rows as JSON documents", target, table.row_count());
            return self
                .documents
                .insert_records(&table.to_records(), target, &schema, &DocumentMetadata::from_source(source_id))
                .await;
        }

        let plan = StructuredPlan::build(table, target, &schema, source_id, Utc::now());
        if !plan.dropped().is_empty() {
            debug!("Columns not present on {}: {:?}", target, plan.dropped());
        }
        if plan.has_no_columns() && !table.is_empty() {
            return Err(LandingError::Store(format!(
                "{} has no column to load {} rows into",
                target,
                table.row_count()
            )));
        }

        let rows = plan.rows(table);
        if self.options.atomic_replace {
            self.store.replace_rows(plan.statement(), &rows).await
        } else {
            self.store.truncate(target).await?;
            self.store.append_rows(plan.statement(), &rows).await
        }
    }
}
