use landing_ingest::config::{ObjectStorageConfig, SourceMapping};
use landing_ingest::db::{LandingStore, MemoryStore, SqlValue};
use landing_ingest::ingestion::{
    ApiConnector, DocumentLoader, FileConnector, LoadOptions, ObjectStorageConnector, PayloadLoader,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload_loader(store: &Arc<MemoryStore>) -> PayloadLoader {
    let store: Arc<dyn LandingStore> = store.clone();
    PayloadLoader::new(store, LoadOptions::default())
}

fn api(store: &Arc<MemoryStore>) -> ApiConnector {
    let store: Arc<dyn LandingStore> = store.clone();
    ApiConnector::new(DocumentLoader::new(store))
}

fn object_storage(server: &MockServer, store: &Arc<MemoryStore>) -> ObjectStorageConnector {
    let config = ObjectStorageConfig {
        url_template: Some(format!("{}/{{bucket}}/{{key}}", server.uri())),
        bucket_name: Some("raw-data".to_string()),
        ..ObjectStorageConfig::default()
    };
    ObjectStorageConnector::new(config, payload_loader(store))
}

#[tokio::test]
async fn test_api_endpoint_to_document_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "a"},
            {"id": 2, "name": "b"},
            {"id": 3, "name": "c"}
        ])))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table(
        "lnd_items",
        &["raw_data", "loaded_at", "api_endpoint", "response_status"],
    ));
    let endpoint = format!("{}/items", server.uri());

    assert!(api(&store).extract_endpoint(&endpoint, "lnd_items").await);

    let rows = store.rows("lnd_items");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["api_endpoint"] == SqlValue::Text(endpoint.clone())));
    assert!(rows.iter().all(|r| r["response_status"] == SqlValue::Int(200)));
    assert!(rows.iter().all(|r| r["loaded_at"] == rows[0]["loaded_at"]));
}

#[tokio::test]
async fn test_api_error_status_fails_without_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table("lnd_items", &["raw_data"]));
    let connector = api(&store);

    let response = connector.fetch(&format!("{}/broken", server.uri())).await;
    assert!(response.is_err());
    assert!(!connector.extract_endpoint(&format!("{}/broken", server.uri()), "lnd_items").await);
    assert!(store.rows("lnd_items").is_empty());
}

#[tokio::test]
async fn test_api_fetch_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/created"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let response = api(&store).fetch(&format!("{}/created", server.uri())).await.unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(response.data, json!({"ok": true}));
}

#[tokio::test]
async fn test_api_extract_all_counts_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table("lnd_ok", &["raw_data"]));
    let endpoints = vec![
        SourceMapping::new(format!("{}/ok", server.uri()), "lnd_ok"),
        SourceMapping::new(format!("{}/missing", server.uri()), "lnd_ok"),
    ];

    let summary = api(&store).extract_all(&endpoints).await;
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.succeeded(), 1);
    assert!(!summary.success());
}

#[tokio::test]
async fn test_object_storage_csv_to_structured_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw-data/CSV/prices.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Id,Price\n1,9.5\n2,3.25\n"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table("lnd_prices", &["id", "price", "loaded_at"]));

    assert!(object_storage(&server, &store).extract_file("CSV/prices.csv", "lnd_prices").await);

    let rows = store.rows("lnd_prices");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], SqlValue::Int(1));
    assert_eq!(rows[1]["price"], SqlValue::Float(3.25));
    assert!(rows.iter().all(|r| matches!(r["loaded_at"], SqlValue::Timestamp(_))));
}

#[tokio::test]
async fn test_object_storage_json_to_document_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw-data/JSON/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": [1, 2]})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table("lnd_products", &["raw_data", "file_name"]));

    assert!(object_storage(&server, &store).extract_file("JSON/products.json", "lnd_products").await);

    let rows = store.rows("lnd_products");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["raw_data"], SqlValue::Json(json!({"products": [1, 2]})));
    assert_eq!(rows[0]["file_name"], SqlValue::Text("JSON/products.json".into()));
}

#[tokio::test]
async fn test_object_storage_rejects_unknown_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("binary"))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table("lnd_report", &["raw_data"]));
    assert!(!object_storage(&server, &store).extract_file("XLSX/report.xlsx", "lnd_report").await);
    assert!(store.rows("lnd_report").is_empty());
}

#[tokio::test]
async fn test_object_storage_malformed_csv_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw-data/CSV/empty.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new().with_table("lnd_prices", &["id"]));
    assert!(!object_storage(&server, &store).extract_file("CSV/empty.csv", "lnd_prices").await);
    assert_eq!(store.truncations("lnd_prices"), 0);
}

#[tokio::test]
async fn test_local_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("customers.csv");
    std::fs::write(&file, "Customer ID,Full Name\n1,Ada\n2,Grace\n").unwrap();

    let store = Arc::new(MemoryStore::new().with_table(
        "lnd_customers",
        &["customer_id", "full_name", "source_file"],
    ));
    let connector = FileConnector::new(payload_loader(&store));
    let path = file.to_string_lossy().into_owned();

    assert!(connector.extract_file(&path, "lnd_customers").await);

    let rows = store.rows("lnd_customers");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["full_name"], SqlValue::Text("Grace".into()));
    assert_eq!(rows[0]["source_file"], SqlValue::Text("customers.csv".into()));
}

#[tokio::test]
async fn test_local_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json").to_string_lossy().into_owned();

    let store = Arc::new(MemoryStore::new().with_table("lnd_items", &["raw_data"]));
    let summary = FileConnector::new(payload_loader(&store))
        .extract_all(&[SourceMapping::new(path, "lnd_items")])
        .await;
    assert_eq!(summary.failed(), 1);
}
