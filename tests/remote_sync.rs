use std::sync::Arc;

use chrono::NaiveDate;
use growth_space::prelude::*;
use growth_space::SyncClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn habit_row() -> serde_json::Value {
    json!({
        "id": "8c4b4f9e-58a5-4cf1-8b09-2f0f0d1f7c1e",
        "name": "Run",
        "category": "Health",
        "frequency": "daily",
        "isOneTime": false,
        "daysOfWeek": [1, 3, 5],
        "time": "06:00",
        "streak": 2,
        "completedDates": ["2026-01-05"],
        "createdAt": "2026-01-01T08:00:00Z",
        "user_id": "user-1",
        "updated_at": "2026-01-05T08:00:00Z"
    })
}

fn profile_row() -> serde_json::Value {
    json!({
        "name": "Dana",
        "email": "dana@example.com",
        "isPremium": false,
        "identityStatement": "I am a person who shows up.",
        "focusAreas": ["Health"],
        "user_id": "user-1",
        "updated_at": "2026-01-05T08:00:00Z"
    })
}

#[tokio::test]
async fn remote_state_hydrates_the_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/habits"))
        .and(query_param("user_id", "eq.user-1"))
        .and(query_param("order", "createdAt.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([habit_row()])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .and(query_param("user_id", "eq.user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row()])))
        .mount(&mock_server)
        .await;

    let client = Arc::new(SyncClient::new(&mock_server.uri(), "anon-key"));
    let store = HabitStore::open(Arc::new(RemoteStore::new(client, "user-1"))).await;

    assert_eq!(store.habits().len(), 1);
    let habit = &store.habits()[0];
    assert_eq!(habit.name, "Run");
    assert_eq!(habit.streak, 2);
    assert!(habit.is_completed_on(date("2026-01-05")));
    assert!(habit.is_due_on(date("2026-01-05")));

    let profile = store.profile().unwrap();
    assert_eq!(profile.name, "Dana");
    assert_eq!(profile.primary_focus(), Category::Health);
}

#[tokio::test]
async fn an_unreachable_backend_degrades_to_an_empty_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/habits"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let client = Arc::new(SyncClient::new(&mock_server.uri(), "anon-key"));
    let mut store = HabitStore::open(Arc::new(RemoteStore::new(client, "user-1"))).await;

    assert!(store.habits().is_empty());
    // The store stays usable; mutations apply in memory even while the
    // backend is down
    store.create(&HabitDraft::named("Offline habit")).unwrap();
    assert_eq!(store.habits().len(), 1);
}

#[tokio::test]
async fn flush_upserts_per_user_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/habits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/habits"))
        .and(query_param("on_conflict", "id"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1..)
        .mount(&mock_server)
        .await;

    let client = Arc::new(SyncClient::new(&mock_server.uri(), "anon-key"));
    let mut store = HabitStore::open(Arc::new(RemoteStore::new(client, "user-1"))).await;

    store
        .create(&HabitDraft::named("Run").with_days_of_week([1, 3, 5]))
        .unwrap();
    store.flush().await.unwrap();
}
