//! Payload classification shared by the source connectors

use crate::db::LandingStore;
use crate::error::{LandingError, Result};
use crate::ingestion::document_loader::{DocumentLoader, DocumentMetadata};
use crate::ingestion::table::Table;
use crate::ingestion::tabular_loader::TabularLoader;
use crate::ingestion::LoadOptions;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Payload format, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Csv,
}

impl PayloadFormat {
    /// Case-insensitive `.json` / `.csv` suffix; anything else is unsupported
    pub fn from_path(path: &str) -> Result<Self> {
        let lowered = path.to_ascii_lowercase();
        if lowered.ends_with(".json") {
            Ok(Self::Json)
        } else if lowered.ends_with(".csv") {
            Ok(Self::Csv)
        } else {
            Err(LandingError::UnsupportedFormat(path.to_string()))
        }
    }
}

/// A parsed source payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Documents(Value),
    Table(Table),
}

impl Payload {
    pub fn parse(format: PayloadFormat, bytes: &[u8]) -> Result<Self> {
        match format {
            PayloadFormat::Json => Ok(Self::Documents(serde_json::from_slice(bytes)?)),
            PayloadFormat::Csv => Ok(Self::Table(Table::from_csv_reader(bytes)?)),
        }
    }
}

/// Routes a payload to the loader for its shape
#[derive(Clone)]
pub struct PayloadLoader {
    documents: DocumentLoader,
    tabular: TabularLoader,
}

impl PayloadLoader {
    pub fn new(store: Arc<dyn LandingStore>, options: LoadOptions) -> Self {
        Self {
            documents: DocumentLoader::with_options(Arc::clone(&store), options),
            tabular: TabularLoader::with_options(store, options),
        }
    }

    pub fn documents(&self) -> &DocumentLoader {
        &self.documents
    }

    pub async fn load_payload(&self, payload: Payload, table_name: &str, source_id: &str) -> bool {
        match payload {
            Payload::Documents(value) => {
                debug!("Loading {} as JSON documents into {}", source_id, table_name);
                self.documents
                    .load(value, table_name, &DocumentMetadata::from_source(Some(source_id)))
                    .await
            }
            Payload::Table(table) => {
                debug!("Loading {} ({} rows) into {}", source_id, table.row_count(), table_name);
                self.tabular.load(&table, table_name, Some(source_id)).await
            }
        }
    }
}
