use std::fs;
use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wages_core::{Document, Rate, Region, Sector, WageError};
use wages_engine::{
    FileRecordStore, HttpRecordStore, RecordStore, StoreSettings, CANNOT_READ, DATA_NOT_FOUND,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(wages_logging::initialize_for_tests);
}

fn document() -> Document {
    let mut document = Document::new(vec![Region {
        id: "car".to_string(),
        name: "Cordillera Administrative Region".to_string(),
        wage_order: "CAR-24".to_string(),
        date_effective: "2024-12-02".to_string(),
        rates: vec![Rate::single(Sector::NonAgriculture, 470.0, "All establishments")],
        notes: String::new(),
    }]);
    document.last_updated = "2024-12-02".to_string();
    document
}

#[tokio::test]
async fn file_store_reports_missing_file() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = FileRecordStore::new(temp.path().join("wages.json"));

    let err = store.read().await.unwrap_err();
    assert_eq!(err, WageError::NotFound(DATA_NOT_FOUND.to_string()));
}

#[tokio::test]
async fn file_store_reports_invalid_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wages.json");
    fs::write(&path, "{ not json").unwrap();

    match FileRecordStore::new(&path).read().await {
        Err(WageError::Format(reason)) => {
            assert!(reason.starts_with("Invalid JSON in data file"), "{reason}")
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn file_store_reports_unreadable_path() {
    let temp = TempDir::new().unwrap();
    let store = FileRecordStore::new(temp.path());

    let err = store.read().await.unwrap_err();
    assert_eq!(err, WageError::transport(CANNOT_READ));
}

#[tokio::test]
async fn file_store_replaces_whole_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data").join("wages.json");
    let store = FileRecordStore::new(&path);

    store.replace(&Document::default()).await.unwrap();
    store.replace(&document()).await.unwrap();

    assert_eq!(store.read().await.unwrap(), document());
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n  \"regions\""), "expected pretty JSON: {raw}");
    let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[tokio::test]
async fn http_store_reads_document() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&document()))
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&server.uri(), &StoreSettings::default()).unwrap();
    assert_eq!(store.read().await.unwrap(), document());
}

#[tokio::test]
async fn http_store_treats_error_field_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Cannot read data file"})))
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&server.uri(), &StoreSettings::default()).unwrap();
    let err = store.read().await.unwrap_err();
    assert_eq!(err, WageError::transport("Cannot read data file"));
}

#[tokio::test]
async fn http_store_maps_missing_data_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wages"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Data file not found"})))
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&server.uri(), &StoreSettings::default()).unwrap();
    let err = store.read().await.unwrap_err();
    assert_eq!(err, WageError::NotFound(DATA_NOT_FOUND.to_string()));
}

#[tokio::test]
async fn http_store_posts_full_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wages"))
        .and(body_json(&document()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "Data updated"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&format!("{}/", server.uri()), &StoreSettings::default()).unwrap();
    store.replace(&document()).await.unwrap();
}

#[tokio::test]
async fn http_store_reports_bare_status_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&server.uri(), &StoreSettings::default()).unwrap();
    match store.replace(&document()).await {
        Err(WageError::Transport(reason)) => assert!(reason.starts_with("HTTP 500"), "{reason}"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn http_store_rejects_malformed_base_url() {
    assert!(matches!(
        HttpRecordStore::new("not a url", &StoreSettings::default()),
        Err(WageError::Transport(_))
    ));
}
