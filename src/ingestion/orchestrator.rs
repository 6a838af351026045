//! Ingestion Orchestrator - runs every configured source mapping in order

use crate::config::LandingConfig;
use crate::db::LandingStore;
use crate::ingestion::api_connector::ApiConnector;
use crate::ingestion::connector::PayloadLoader;
use crate::ingestion::file_connector::FileConnector;
use crate::ingestion::s3_connector::ObjectStorageConnector;
use crate::observability::ExtractionSummary;
use clap::ValueEnum;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which configured sources a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    #[default]
    All,
    Api,
    #[value(alias = "object-store")]
    S3,
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::All => "all",
            SourceKind::Api => "api",
            SourceKind::S3 => "s3",
            SourceKind::Local => "local",
        };
        f.write_str(name)
    }
}

pub struct Orchestrator {
    config: LandingConfig,
    store: Arc<dyn LandingStore>,
    api: ApiConnector,
    object_storage: ObjectStorageConnector,
    files: FileConnector,
}

impl Orchestrator {
    pub fn new(config: LandingConfig, store: Arc<dyn LandingStore>) -> Self {
        let loader = PayloadLoader::new(Arc::clone(&store), config.load);
        Self {
            api: ApiConnector::new(loader.documents().clone()),
            object_storage: ObjectStorageConnector::new(config.s3.clone(), loader.clone()),
            files: FileConnector::new(loader),
            config,
            store,
        }
    }

    pub fn config(&self) -> &LandingConfig {
        &self.config
    }

    pub async fn extract_api(&self) -> ExtractionSummary {
        info!("Starting API extraction process...");
        let summary = self.api.extract_all(&self.config.api.endpoints).await;
        Self::report("API", &summary);
        summary
    }

    pub async fn extract_object_storage(&self) -> ExtractionSummary {
        info!("Starting S3 extraction process...");
        let summary = self.object_storage.extract_all(&self.config.s3.files).await;
        Self::report("S3", &summary);
        summary
    }

    pub async fn extract_local(&self) -> ExtractionSummary {
        info!("Starting local file extraction process...");
        let summary = self.files.extract_all(&self.config.local.files).await;
        Self::report("Local file", &summary);
        summary
    }

    /// Object storage, then API, then local files. Every kind runs even after a failure.
    pub async fn extract_all(&self) -> bool {
        info!("Starting full extraction process...");

        let s3_success = self.extract_object_storage().await.success();
        let api_success = self.extract_api().await.success();
        let local_success = if self.config.local.files.is_empty() {
            true
        } else {
            self.extract_local().await.success()
        };

        let success = s3_success && api_success && local_success;
        if success {
            info!("Full extraction process completed successfully");
        } else {
            warn!("Full extraction process completed with some errors");
        }
        success
    }

    /// Run the extraction for `kind`, then release the database session
    pub async fn run(&self, kind: SourceKind) -> bool {
        info!("Starting extraction process for source: {}", kind);

        let success = match kind {
            SourceKind::All => self.extract_all().await,
            SourceKind::Api => self.extract_api().await.success(),
            SourceKind::S3 => self.extract_object_storage().await.success(),
            SourceKind::Local => self.extract_local().await.success(),
        };

        self.store.close().await;
        success
    }

    fn report(label: &str, summary: &ExtractionSummary) {
        if summary.success() {
            info!("{} extraction completed successfully", label);
        } else {
            error!("{} extraction completed with errors", label);
        }
    }
}
