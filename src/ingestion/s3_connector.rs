//! Object storage connector - public objects fetched over HTTP by key

use crate::config::{ObjectStorageConfig, SourceMapping};
use crate::error::{LandingError, Result};
use crate::ingestion::connector::{Payload, PayloadFormat, PayloadLoader};
use crate::observability::ExtractionSummary;
use tracing::{error, info};

#[derive(Clone)]
pub struct ObjectStorageConnector {
    client: reqwest::Client,
    config: ObjectStorageConfig,
    loader: PayloadLoader,
}

impl ObjectStorageConnector {
    pub fn new(config: ObjectStorageConfig, loader: PayloadLoader) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            loader,
        }
    }

    /// Fill the URL template with bucket, region and `key`
    pub fn public_url(&self, key: &str) -> Result<String> {
        let template = self.config.url_template();
        let bucket = self.config.bucket_name.as_deref();
        let region = self.config.region.as_deref();

        if template.contains("{bucket}") && bucket.is_none() {
            return Err(LandingError::Config("S3 bucket name is not set (S3_BUCKET_NAME)".to_string()));
        }
        if template.contains("{region}") && region.is_none() {
            return Err(LandingError::Config("S3 region is not set (AWS_REGION)".to_string()));
        }

        let url = template
            .replace("{bucket}", bucket.unwrap_or_default())
            .replace("{region}", region.unwrap_or_default())
            .replace("{key}", key);
        info!("Generated public URL: {}", url);
        Ok(url)
    }

    /// Download and parse `key`. No request timeout is applied.
    pub async fn download(&self, key: &str) -> Result<Payload> {
        let format = PayloadFormat::from_path(key)?;
        let url = self.public_url(key)?;
        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Payload::parse(format, &bytes)
    }

    pub async fn extract_file(&self, key: &str, table_name: &str) -> bool {
        let payload = match self.download(key).await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error downloading {}: {}", key, e);
                return false;
            }
        };

        let success = self.loader.load_payload(payload, table_name, key).await;
        if success {
            info!("Successfully extracted {} to {}", key, table_name);
        } else {
            error!("Failed to extract {} to {}", key, table_name);
        }
        success
    }

    pub async fn extract_all(&self, files: &[SourceMapping]) -> ExtractionSummary {
        let mut summary = ExtractionSummary::new("S3");
        info!("Starting extraction of {} files from S3", files.len());

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
