//! Test the landing database connection
//!
//! Run with: cargo run --bin check_connection

use landing_ingest::config::{load_env_file, locate_config, LandingConfig};
use landing_ingest::db::{DatabaseConnector, PostgresStore, TableName};
use landing_ingest::ingestion::SchemaInspector;
use std::collections::BTreeSet;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    load_env_file(None);

    println!("🔌 Testing PostgreSQL Connection...\n");

    let config = match locate_config(None).and_then(|path| LandingConfig::load(&path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Could not load configuration: {}", e);
            eprintln!("   Put a config.yaml with database.database next to the binary or in the working directory");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "📡 Connecting to: {}:{}/{}",
        config.database.host, config.database.port, config.database.database
    );

    let store = PostgresStore::new(DatabaseConnector::new(config.database.clone()));
    let pool = match store.connector().pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Connection failed: {}", e);
            eprintln!("\n💡 Troubleshooting:");
            eprintln!("   1. Is PostgreSQL running? (check with: pg_isready)");
            eprintln!("   2. Does the database '{}' exist?", config.database.database);
            eprintln!("   3. Are DB_USER and DB_PASSWORD correct?");
            eprintln!("   4. Is port {} accessible?", config.database.port);
            return ExitCode::FAILURE;
        }
    };
    println!("✅ Connected successfully!\n");

    match sqlx::query_as::<_, (i64,)>(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public'",
    )
    .fetch_one(&pool)
    .await
    {
        Ok((count,)) => println!("   📊 Tables in database: {}", count),
        Err(e) => println!("   ⚠️  Could not count tables: {}", e),
    }

    let tables: BTreeSet<&str> = config
        .api
        .endpoints
        .iter()
        .chain(&config.s3.files)
        .chain(&config.local.files)
        .map(|m| m.table.as_str())
        .collect();

    let inspector = SchemaInspector::new(&store);
    for table in tables {
        let schema = inspector.inspect(&TableName::parse(table)).await;
        if schema.is_empty() {
            println!("   ⚠️  {}: not found", table);
        } else {
            println!("   📋 {} ({:?}): {}", table, schema.mode(), schema.column_names().join(", "));
        }
    }

    store.connector().close().await;
    println!("\n✅ Database connection test completed successfully!");
    ExitCode::SUCCESS
}
