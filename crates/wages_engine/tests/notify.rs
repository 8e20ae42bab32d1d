use std::fs;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wages_core::{UpdateEvent, WageError};
use wages_engine::{
    parse_update_event, ChangeNotifier, HttpNotifier, MemoryNotifier, SignalFileNotifier,
    StoreSettings, SIGNAL_FILE_NAME,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event() -> UpdateEvent {
    UpdateEvent::wage_update("2024-06-05", "2024-06-05T10:00:00.000Z")
}

#[test]
fn parses_wire_events() {
    let raw = r#"{"lastUpdated":"2024-06-05","timestamp":"t1","type":"wage-update","message":"m"}"#;
    let parsed = parse_update_event(raw).unwrap();
    assert_eq!(parsed.timestamp, "t1");
    assert_eq!(parsed.last_updated, "2024-06-05");

    let wrong_kind = r#"{"lastUpdated":"x","timestamp":"t1","type":"ping"}"#;
    assert!(matches!(parse_update_event(wrong_kind), Err(WageError::Format(_))));
    assert!(matches!(parse_update_event("{}"), Err(WageError::Format(_))));

    let undated = r#"{"lastUpdated":"","timestamp":"t1","type":"wage-update","message":"m"}"#;
    assert!(matches!(parse_update_event(undated), Err(WageError::Format(_))));
}

#[tokio::test]
async fn memory_notifier_keeps_latest_event() {
    let notifier = MemoryNotifier::new();
    assert_eq!(notifier.latest().await.unwrap(), None);

    notifier.publish(&event()).await.unwrap();
    let newer = UpdateEvent::wage_update("2024-06-06", "2024-06-06T08:00:00.000Z");
    notifier.publish(&newer).await.unwrap();

    assert_eq!(notifier.latest().await.unwrap(), Some(newer));
}

#[tokio::test]
async fn memory_notifier_rejects_foreign_events() {
    let notifier = MemoryNotifier::new();
    let mut foreign = event();
    foreign.kind = "ping".to_string();

    assert!(notifier.publish(&foreign).await.is_err());
    assert_eq!(notifier.snapshot(), None);
}

#[tokio::test]
async fn signal_file_sits_beside_data_file() {
    let temp = TempDir::new().unwrap();
    let notifier = SignalFileNotifier::beside(&temp.path().join("wages.json"));
    assert_eq!(notifier.latest().await.unwrap(), None);

    notifier.publish(&event()).await.unwrap();

    let raw = fs::read_to_string(temp.path().join(SIGNAL_FILE_NAME)).unwrap();
    assert!(raw.contains("\"type\":\"wage-update\""), "{raw}");
    assert_eq!(notifier.latest().await.unwrap(), Some(event()));
}

#[tokio::test]
async fn http_notifier_round_trips_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/updates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/updates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&event()))
        .mount(&server)
        .await;

    let notifier = HttpNotifier::new(&server.uri(), &StoreSettings::default()).unwrap();
    notifier.publish(&event()).await.unwrap();
    assert_eq!(notifier.latest().await.unwrap(), Some(event()));
}

#[tokio::test]
async fn http_notifier_reads_null_as_no_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/updates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let notifier = HttpNotifier::new(&server.uri(), &StoreSettings::default()).unwrap();
    assert_eq!(notifier.latest().await.unwrap(), None);
}
