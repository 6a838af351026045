//! Local file connector - JSON and CSV files read from disk

use crate::config::SourceMapping;
use crate::error::Result;
use crate::ingestion::connector::{Payload, PayloadFormat, PayloadLoader};
use crate::observability::ExtractionSummary;
use std::path::Path;
use tracing::{error, info};

#[derive(Clone)]
pub struct FileConnector {
    loader: PayloadLoader,
}

impl FileConnector {
    pub fn new(loader: PayloadLoader) -> Self {
        Self { loader }
    }

    pub async fn read(&self, path: &str) -> Result<Payload> {
        let format = PayloadFormat::from_path(path)?;
        let bytes = tokio::fs::read(Path::new(path)).await?;
        Payload::parse(format, &bytes)
    }

    pub async fn extract_file(&self, path: &str, table_name: &str) -> bool {
        let payload = match self.read(path).await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error reading {}: {}", path, e);
                return false;
            }
        };

        let source_id = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);
        let success = self.loader.load_payload(payload, table_name, source_id).await;
        if success {
            info!("Successfully extracted {} to {}", path, table_name);
        } else {
            error!("Failed to extract {} to {}", path, table_name);
        }
        success
    }

    pub async fn extract_all(&self, files: &[SourceMapping]) -> ExtractionSummary {
        let mut summary = ExtractionSummary::new("Local file");
        info!("Starting extraction of {} local files", files.len());

        for mapping in files {
            info!("Processing {} -> {}", mapping.source, mapping.table);
            let success = self.extract_file(&mapping.source, &mapping.table).await;
            if !success {
                error!("Failed to process {}", mapping.source);
            }
            summary.record(success);
        }

        summary.log();
        summary
    }
}
