//! API Connector - GET JSON from configured endpoints into document tables

use crate::config::SourceMapping;
use crate::error::Result;
use crate::ingestion::document_loader::{DocumentLoader, DocumentMetadata};
use crate::observability::ExtractionSummary;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Body and status of a successful request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data: Value,
    pub status: u16,
}

#[derive(Clone)]
pub struct ApiConnector {
    client: reqwest::Client,
    documents: DocumentLoader,
}

impl ApiConnector {
    pub fn new(documents: DocumentLoader) -> Self {
        Self::with_client(reqwest::Client::new(), documents)
    }

    pub fn with_client(client: reqwest::Client, documents: DocumentLoader) -> Self {
        Self { client, documents }
    }

    /// GET `endpoint` with a fixed timeout. Non-2xx statuses are errors.
    pub async fn fetch(&self, endpoint: &str) -> Result<ApiResponse> {
        let response = self
            .client
            .get(endpoint)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Request to {} timed out after {}s", endpoint, API_TIMEOUT.as_secs());
                }
                e
            })?
            .error_for_status()?;

        let status = response.status().as_u16();
        let data = response.json::<Value>().await?;
        info!("Successfully retrieved data from {} (Status: {})", endpoint, status);

        Ok(ApiResponse { data, status })
    }

    pub async fn extract_endpoint(&self, endpoint: &str, table_name: &str) -> bool {
        let response = match self.fetch(endpoint).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to retrieve data from {}: {}", endpoint, e);
                return false;
            }
        };

        let metadata = DocumentMetadata::from_api(endpoint, response.status);
        let success = self.documents.load(response.data, table_name, &metadata).await;
        if success {
            info!("Successfully extracted data from {} to {}", endpoint, table_name);
        } else {
            error!("Failed to load data from {} to {}", endpoint, table_name);
        }
        success
    }

    pub async fn extract_all(&self, endpoints: &[SourceMapping]) -> ExtractionSummary {
        let mut summary = ExtractionSummary::new("API");
        info!("Starting extraction from {} API endpoints", endpoints.len());

        for mapping in endpoints {
            info!("Processing {} -> {}", mapping.source, mapping.table);
            let success = self.extract_endpoint(&mapping.source, &mapping.table).await;
            if !success {
                error!("Failed to process {}", mapping.source);
            }
            summary.record(success);
        }

        summary.log();
        summary
    }
}
