use anyhow::{Context, Result};
use clap::Parser;
use landing_ingest::config::{load_env_file, locate_config, LandingConfig};
use landing_ingest::db::{DatabaseConnector, LandingStore, PostgresStore};
use landing_ingest::ingestion::{Orchestrator, SourceKind};
use landing_ingest::observability::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "landing-ingest")]
#[command(about = "Extract API, object storage and local file data into landing tables")]
struct Args {
    /// Sources to extract
    #[arg(value_enum, default_value_t = SourceKind::All)]
    source: SourceKind,

    /// Path to config.yaml (default: searched next to the working directory and the binary)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a .env file
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "landing_ingest=debug,sqlx=warn" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let env_file = load_env_file(args.env_file.as_deref());
    init_logging(args.log_level.as_deref())?;
    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let config_path = locate_config(args.config.as_deref())?;
    info!("Using configuration {}", config_path.display());
    let config = LandingConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let store: Arc<dyn LandingStore> = Arc::new(PostgresStore::new(DatabaseConnector::new(config.database.clone())));
    let orchestrator = Orchestrator::new(config, store);

    let success = orchestrator.run(args.source).await;
    if success {
        info!("Extraction process completed successfully");
    } else {
        error!("Extraction process failed");
    }
    Ok(success)
}
