//! Ingestion - fetch source payloads and land them in destination tables

pub mod api_connector;
pub mod connector;
pub mod document_loader;
pub mod file_connector;
pub mod insert_builder;
pub mod normalize;
pub mod orchestrator;
pub mod s3_connector;
pub mod schema_inspector;
pub mod table;
pub mod tabular_loader;

use serde::Deserialize;

pub use api_connector::{ApiConnector, ApiResponse, API_TIMEOUT};
pub use connector::{Payload, PayloadFormat, PayloadLoader};
pub use document_loader::{into_records, DocumentLoader, DocumentMetadata};
pub use file_connector::FileConnector;
pub use insert_builder::{InsertBuilder, RowTemplate};
pub use normalize::to_snake_case;
pub use orchestrator::{Orchestrator, SourceKind};
pub use s3_connector::ObjectStorageConnector;
pub use schema_inspector::{IngestionMode, SchemaInspector, TableSchema};
pub use table::Table;
pub use tabular_loader::{StructuredPlan, TabularLoader};

/// Generic document column; its presence switches a table to document mode
pub const DOCUMENT_COLUMN: &str = "raw_data";
pub const LOADED_AT_COLUMN: &str = "loaded_at";
/// Source identifier on the document path
pub const FILE_NAME_COLUMN: &str = "file_name";
/// Source identifier on the structured path
pub const SOURCE_FILE_COLUMN: &str = "source_file";
pub const API_ENDPOINT_COLUMN: &str = "api_endpoint";
pub const REQUEST_TIMESTAMP_COLUMN: &str = "request_timestamp";
pub const RESPONSE_STATUS_COLUMN: &str = "response_status";

/// Write behaviour of the loaders (`load` section of the config)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Truncate and append in one transaction on the structured path
    pub atomic_replace: bool,

    /// Empty document tables before each batch, in the batch's transaction
    pub truncate_document_tables: bool,
}
