//! Contract tests for CycleClient against the `cycle_entries` table.
//!
//! ## Requests Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/rest/v1/cycle_entries?on_conflict=user_id,date` | `save_entry_*` |
//! | GET    | `/rest/v1/cycle_entries` | `list_entries_*`, `entry_for_*` |
//! | DELETE | `/rest/v1/cycle_entries` | `delete_entry_*` |

use lumina_core::{CalendarDate, CycleEntryId, SymptomLog, UserId};
use lumina_store_client::{StoreClient, StoreConfig, StoreError};
use wiremock::matchers::{body_partial_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
const ENTRY: &str = "550e8400-e29b-41d4-a716-446655440000";

fn user() -> UserId {
    UserId::parse(USER).unwrap()
}

fn test_client(mock_server: &MockServer) -> StoreClient {
    StoreClient::new(StoreConfig::local_mock(&mock_server.uri(), user()).unwrap()).unwrap()
}

fn day(d: u32) -> CalendarDate {
    CalendarDate::from_ymd(2026, 3, d).unwrap()
}

fn row(date: &str, cycle_day: u32, symptoms: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "id": ENTRY,
        "user_id": USER,
        "date": date,
        "cycle_day": cycle_day,
        "logged_symptoms": symptoms,
        "created_at": "2026-03-14T08:00:00+00:00",
        "updated_at": "2026-03-14T08:00:00+00:00"
    })
}

// ── POST (upsert) ────────────────────────────────────────────────────

#[tokio::test]
async fn save_entry_upserts_on_user_and_date() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cycle_entries"))
        .and(query_param("on_conflict", "user_id,date"))
        .and(header("apikey", "test-anon-key"))
        .and(header("authorization", "Bearer test-access-token"))
        .and(headers(
            "prefer",
            vec!["resolution=merge-duplicates", "return=representation"],
        ))
        .and(body_partial_json(serde_json::json!({
            "user_id": USER,
            "date": "2026-03-14",
            "cycle_day": 14,
            "logged_symptoms": ["calm", "cramps"]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!([row(
                "2026-03-14",
                14,
                &["calm", "cramps"]
            )])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut symptoms = SymptomLog::new();
    symptoms.log("calm").unwrap();
    symptoms.log("cramps").unwrap();

    let client = test_client(&mock_server);
    let entry = client.cycle().save_entry(day(14), 14, &symptoms).await.unwrap();
    assert_eq!(entry.date, day(14));
    assert_eq!(entry.symptoms(), symptoms);
}

#[tokio::test]
async fn save_entry_surfaces_store_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cycle_entries"))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .cycle()
        .save_entry(day(1), 1, &SymptomLog::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("JWT expired"));
}

#[tokio::test]
async fn save_entry_without_returned_row_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cycle_entries"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .cycle()
        .save_entry(day(1), 1, &SymptomLog::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyResponse { .. }));
}

// ── GET ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_entries_filters_and_orders_newest_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cycle_entries"))
        .and(query_param("user_id", format!("eq.{USER}")))
        .and(query_param("order", "date.desc"))
        .and(query_param("date", "gte.2026-03-01"))
        .and(query_param("date", "lte.2026-03-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            row("2026-03-15", 15, &[]),
            row("2026-03-14", 14, &["fatigue"]),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let entries = client
        .cycle()
        .list_entries(Some(day(1)), Some(day(31)))
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].date > entries[1].date);
}

#[tokio::test]
async fn entry_for_returns_none_when_day_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cycle_entries"))
        .and(query_param("date", "eq.2026-03-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(client.cycle().entry_for(day(2)).await.unwrap().is_none());
}

#[tokio::test]
async fn entry_for_rejects_duplicate_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cycle_entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            row("2026-03-02", 2, &[]),
            row("2026-03-02", 2, &[]),
        ])))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.cycle().entry_for(day(2)).await.unwrap_err();
    assert!(matches!(err, StoreError::MultipleRows { count: 2, .. }));
}

#[tokio::test]
async fn list_entries_reports_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cycle_entries"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.cycle().list_entries(None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::Deserialization { .. }));
}

// ── DELETE ───────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_entry_targets_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/cycle_entries"))
        .and(query_param("id", format!("eq.{ENTRY}")))
        .and(query_param("user_id", format!("eq.{USER}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client
        .cycle()
        .delete_entry(CycleEntryId::parse(ENTRY).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn unreachable_store_is_http_error() {
    let config = StoreConfig::local_mock("http://127.0.0.1:1", user()).unwrap();
    let client = StoreClient::new(config).unwrap();
    let err = client.cycle().list_entries(None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::Http { .. }));
}
