//! landing-ingest
//!
//! Pulls data from HTTP APIs, public object storage and local files and lands it in
//! PostgreSQL tables. Per destination table the loaders decide from the catalog whether
//! records are spread over matching columns or stored whole in a `raw_data` document column.

pub mod config;
pub mod db;
pub mod error;
pub mod ingestion;
pub mod observability;

pub use config::{LandingConfig, SourceMapping};
pub use error::{LandingError, Result};
pub use ingestion::{Orchestrator, SourceKind};
