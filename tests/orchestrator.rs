use landing_ingest::config::LandingConfig;
use landing_ingest::db::{LandingStore, MemoryStore};
use landing_ingest::ingestion::{Orchestrator, SourceKind};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_sources() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 10})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/CSV/prices.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Id,Price\n1,2.5\n"))
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer, local_file: Option<&str>) -> LandingConfig {
    let uri = server.uri();
    let mut yaml = format!(
        r#"
database:
  database: landing
api:
  endpoints:
    "{uri}/api/users": lnd_users
    "{uri}/api/down": lnd_down
    "{uri}/api/orders": lnd_orders
s3:
  url_template: "{uri}/{{bucket}}/{{key}}"
  bucket_name: raw
  files:
    "CSV/prices.csv": lnd_prices
"#
    );
    if let Some(file) = local_file {
        yaml.push_str(&format!("local:\n  files:\n    \"{}\": lnd_local\n", file));
    }
    LandingConfig::from_yaml_str(&yaml, |_| None).unwrap()
}

fn store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_table("lnd_users", &["raw_data", "api_endpoint"])
            .with_table("lnd_down", &["raw_data"])
            .with_table("lnd_orders", &["raw_data", "response_status"])
            .with_table("lnd_prices", &["id", "price", "loaded_at"])
            .with_table("lnd_local", &["raw_data", "file_name"]),
    )
}

fn orchestrator(config: LandingConfig, store: &Arc<MemoryStore>) -> Orchestrator {
    let store: Arc<dyn LandingStore> = store.clone();
    Orchestrator::new(config, store)
}

#[tokio::test]
async fn test_api_run_continues_past_failures() {
    let server = mock_sources().await;
    let store = store();
    let orchestrator = orchestrator(config(&server, None), &store);

    let summary = orchestrator.extract_api().await;
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert!(!summary.success());

    assert_eq!(store.rows("lnd_users").len(), 2);
    assert_eq!(store.rows("lnd_orders").len(), 1);
    assert!(store.rows("lnd_down").is_empty());
}

#[tokio::test]
async fn test_object_storage_run_succeeds() {
    let server = mock_sources().await;
    let store = store();

    assert!(orchestrator(config(&server, None), &store).run(SourceKind::S3).await);
    assert_eq!(store.rows("lnd_prices").len(), 1);
    assert!(store.rows("lnd_users").is_empty());
}

#[tokio::test]
async fn test_all_runs_every_kind_and_reports_failure() {
    let server = mock_sources().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("extra.json");
    std::fs::write(&file, r#"[{"a": 1}, {"a": 2}]"#).unwrap();
    let file = file.to_string_lossy().into_owned();

    let store = store();
    let success = orchestrator(config(&server, Some(&file)), &store).run(SourceKind::All).await;

    assert!(!success);
    assert_eq!(store.rows("lnd_prices").len(), 1);
    assert_eq!(store.rows("lnd_users").len(), 2);
    assert_eq!(store.rows("lnd_orders").len(), 1);
    assert_eq!(store.rows("lnd_local").len(), 2);
}

#[tokio::test]
async fn test_empty_mapping_succeeds() {
    let config = LandingConfig::from_yaml_str("database:\n  database: landing\n", |_| None).unwrap();
    let store = Arc::new(MemoryStore::new());
    let orchestrator = orchestrator(config, &store);

    assert!(orchestrator.run(SourceKind::Api).await);
    assert!(orchestrator.run(SourceKind::All).await);
    assert!(store.statements().is_empty());
}
