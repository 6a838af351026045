//! Database connection management using sqlx

use crate::error::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};

pub type DbPool = PgPool;

/// Connection parameters for the landing database
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Open a single-connection pool and test it
pub async fn init_pool(config: &DbConfig) -> std::result::Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(config.connect_options())
        .await?;

    // Test the connection
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Owns the database session for the lifetime of the process.
/// The session is opened on first use and reused until `close`; a later call opens a new one.
pub struct DatabaseConnector {
    config: DbConfig,
    pool: Mutex<Option<PgPool>>,
}

impl DatabaseConnector {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub async fn pool(&self) -> Result<PgPool> {
        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.as_ref().filter(|p| !p.is_closed()) {
            return Ok(pool.clone());
        }

        match init_pool(&self.config).await {
            Ok(pool) => {
                info!(
                    "PostgreSQL connection established ({}:{}/{})",
                    self.config.host, self.config.port, self.config.database
                );
                *slot = Some(pool.clone());
                Ok(pool)
            }
            Err(e) => {
                error!("Failed to establish PostgreSQL connection: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn is_open(&self) -> bool {
        self.pool.lock().await.as_ref().is_some_and(|p| !p.is_closed())
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.lock().await.take() {
            pool.close().await;
            info!("PostgreSQL connection closed");
        }
    }
}
