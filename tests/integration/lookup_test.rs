//! Read-through lookup tests
//!
//! Fetches populate the cache mirror; when the network goes away the
//! cached copy of already-seen data is served instead.

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_against, success_body};

#[tokio::test]
async fn test_admin_directory_served_from_cache_when_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!([
            { "id": 1, "name": "Alice", "email": "alice@example.com" }
        ]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;

    let fetched = client.admins().await.unwrap();
    assert_eq!(fetched.len(), 1);

    // The mock is spent; the endpoint now 404s and the cached copy
    // is served instead
    let offline = client.admins().await.unwrap();
    assert_eq!(offline, fetched);

    let cached = client.cache().admins().await.unwrap().unwrap();
    assert!(!cached.cached_at.is_empty());
}

#[tokio::test]
async fn test_room_list_served_from_cache_when_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!([
            { "id": 1, "name": "Support", "last_message_at": "2026-03-01T10:00:00Z" },
            { "id": 2, "name": "Billing", "last_message_at": "2026-03-01T11:00:00Z" }
        ]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    client.refresh_rooms().await.unwrap();

    let offline = client.refresh_rooms().await.unwrap();
    let ids: Vec<i64> = offline.iter().map(|room| room.id).collect();
    // Cached mirror, most recently active first
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_room_details_served_from_cache_when_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rooms/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!({
            "room_id": 4,
            "name": "Escalations",
            "members": [{ "id": 1, "name": "Alice" }],
            "created_at": "2026-01-01T09:00:00Z"
        }))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let details = client.room_details(4).await.unwrap();
    let offline = client.room_details(4).await.unwrap();
    assert_eq!(details, offline);

    // A room never seen has no cached fallback
    assert!(client.room_details(99).await.is_err());
}

#[tokio::test]
async fn test_cached_thread_served_when_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rooms/6/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!([
            { "id": 11, "room_id": 6, "sender_id": 2, "content": "first",
              "created_at": "2026-03-01T10:00:00Z" },
            { "id": 12, "room_id": 6, "sender_id": 3, "content": "second",
              "created_at": "2026-03-01T10:01:00Z" }
        ]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let fetched = client.room_messages(6).await.unwrap();
    assert_eq!(fetched.len(), 2);

    let offline = client.room_messages(6).await.unwrap();
    let server_ids: Vec<_> = offline.iter().filter_map(|m| m.server_id).collect();
    assert_eq!(server_ids, vec![11, 12]);
}

#[tokio::test]
async fn test_search_is_passthrough_and_never_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!([
            { "id": 31, "room_id": 2, "sender_id": 1, "content": "invoice overdue",
              "created_at": "2026-03-01T10:00:00Z" }
        ]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let hits = client.search("invoice").await.unwrap();
    assert_eq!(hits.len(), 1);

    // No mirror for search results: a repeat while offline is an error
    assert!(client.search("invoice").await.is_err());
    assert_eq!(client.cache().stats().await.unwrap().message_count, 0);
}

#[tokio::test]
async fn test_star_message_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages/5/star"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    client.set_message_starred(5, true).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["starred"], true);
}
