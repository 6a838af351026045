//! Document Loader - stores each record as one JSON value plus metadata columns

use crate::db::{LandingStore, SqlValue, TableName};
use crate::error::Result;
use crate::ingestion::insert_builder::InsertBuilder;
use crate::ingestion::schema_inspector::{SchemaInspector, TableSchema};
use crate::ingestion::{
    LoadOptions, API_ENDPOINT_COLUMN, DOCUMENT_COLUMN, FILE_NAME_COLUMN, LOADED_AT_COLUMN,
    REQUEST_TIMESTAMP_COLUMN, RESPONSE_STATUS_COLUMN,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Optional values for the metadata columns of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub source_id: Option<String>,
    pub api_endpoint: Option<String>,
    pub response_status: Option<u16>,
}

impl DocumentMetadata {
    pub fn from_source(source_id: Option<&str>) -> Self {
        Self {
            source_id: source_id.map(str::to_string),
            ..Self::default()
        }
    }

    /// API responses record the endpoint both as source and as endpoint
    pub fn from_api(endpoint: &str, response_status: u16) -> Self {
        Self {
            source_id: Some(endpoint.to_string()),
            api_endpoint: Some(endpoint.to_string()),
            response_status: Some(response_status),
        }
    }
}

/// A single non-array value becomes a one-element batch
pub fn into_records(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(records) => records,
        other => vec![other],
    }
}

#[derive(Clone)]
pub struct DocumentLoader {
    store: Arc<dyn LandingStore>,
    options: LoadOptions,
}

impl DocumentLoader {
    pub fn new(store: Arc<dyn LandingStore>) -> Self {
        Self::with_options(store, LoadOptions::default())
    }

    pub fn with_options(store: Arc<dyn LandingStore>, options: LoadOptions) -> Self {
        Self { store, options }
    }

    /// Load `payload` into `table_name`. Failures are logged and reported as `false`.
    pub async fn load(&self, payload: Value, table_name: &str, metadata: &DocumentMetadata) -> bool {
        let table = TableName::parse(table_name);
        match self.try_load(payload, &table, metadata).await {
            Ok(inserted) => {
                info!("Successfully loaded {} JSON records to {}", inserted, table);
                true
            }
            Err(e) => {
                error!("Failed to load JSON records to {}: {}", table, e);
                false
            }
        }
    }

    pub async fn try_load(&self, payload: Value, table: &TableName, metadata: &DocumentMetadata) -> Result<u64> {
        let records = into_records(payload);
        let schema = SchemaInspector::new(self.store.as_ref()).inspect(table).await;
        self.insert_records(&records, table, &schema, metadata).await
    }

    /// Insert with an already fetched schema. One transaction, one shared timestamp.
    pub(crate) async fn insert_records(
        &self,
        records: &[Value],
        table: &TableName,
        schema: &TableSchema,
        metadata: &DocumentMetadata,
    ) -> Result<u64> {
        if !schema.contains(DOCUMENT_COLUMN) {
            warn!("Table {} has no {} column; insert will likely fail", table, DOCUMENT_COLUMN);
        }

        let captured_at = Utc::now();
        let template = InsertBuilder::new(table.clone(), schema)
            .document(DOCUMENT_COLUMN)
            .value_if_present(LOADED_AT_COLUMN, SqlValue::Timestamp(captured_at))
            .optional(FILE_NAME_COLUMN, metadata.source_id.clone().map(SqlValue::Text))
            .optional(API_ENDPOINT_COLUMN, metadata.api_endpoint.clone().map(SqlValue::Text))
            .value_if_present(REQUEST_TIMESTAMP_COLUMN, SqlValue::Timestamp(captured_at))
            .optional(
                RESPONSE_STATUS_COLUMN,
                metadata.response_status.map(|s| SqlValue::Int(i64::from(s))),
            )
            .build();

        debug!("Document insert for {}: {}", table, template.statement().render(1));

        let rows: Vec<Vec<SqlValue>> = records.iter().map(|record| template.row(record)).collect();
        self.store
            .insert_rows(template.statement(), &rows, self.options.truncate_document_tables)
            .await
    }
}
