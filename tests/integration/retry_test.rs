//! Retry queue integration tests
//!
//! Covers the reconnect-triggered retry pass: arrival-order
//! resubmission, the single combined refresh signal, re-failure
//! accounting, backoff deferral and the dead-letter cap.

use std::sync::atomic::{AtomicI64, Ordering};

use deskchat::{MessageStatus, RetryPolicy, UiEvent};
use pretty_assertions::assert_eq;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::common::{client_against, client_with_policy, drain_events, success_body};

/// Confirms each submitted draft with a fresh server id, echoing the
/// draft's room and content.
struct ConfirmEachSend {
    next_id: AtomicI64,
}

impl ConfirmEachSend {
    fn new() -> Self {
        Self {
            next_id: AtomicI64::new(500),
        }
    }
}

impl Respond for ConfirmEachSend {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let draft: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!({
            "id": id,
            "room_id": draft["room_id"],
            "sender_id": 1,
            "content": draft["content"],
            "created_at": "2026-03-01T10:00:00Z"
        })))
    }
}

/// Seed an unsent entry; returns its temp id.
async fn seed_unsent(
    client: &deskchat::ChatClient,
    room_id: i64,
    content: &str,
    failed: bool,
) -> Uuid {
    let temp_id = Uuid::new_v4();
    client
        .cache()
        .insert_pending(
            &temp_id,
            room_id,
            content,
            None,
            None,
            "2026-03-01T09:00:00Z",
        )
        .await
        .unwrap();
    if failed {
        client
            .cache()
            .mark_failed(&temp_id, "connection reset", "2026-03-01T09:00:01Z")
            .await
            .unwrap();
    }
    temp_id
}

#[tokio::test]
async fn test_reconnect_retries_everything_in_arrival_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .respond_with(ConfirmEachSend::new())
        .mount(&server)
        .await;

    let client = client_against(&server).await;

    // 3 pending and 2 failed, interleaved to pin down arrival order
    seed_unsent(&client, 1, "m1", false).await;
    seed_unsent(&client, 1, "m2", true).await;
    seed_unsent(&client, 2, "m3", false).await;
    seed_unsent(&client, 2, "m4", true).await;
    seed_unsent(&client, 1, "m5", false).await;

    let mut events = client.subscribe();

    client.set_online(false).await;
    let report = client.set_online(true).await.unwrap();

    assert_eq!(report.attempted, 5);
    assert_eq!(report.delivered, 5);
    assert_eq!(report.failed, 0);

    // Exactly 5 sends, in original arrival order
    let requests = server.received_requests().await.unwrap();
    let contents: Vec<String> = requests
        .iter()
        .map(|request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            body["content"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(contents, vec!["m1", "m2", "m3", "m4", "m5"]);

    // One combined refresh signal for the whole batch
    assert_eq!(drain_events(&mut events), vec![UiEvent::ChatListRefresh]);

    // Every entry settled to delivered; nothing unsent remains
    assert!(client.cache().unsent_messages().await.unwrap().is_empty());
    let delivered = client.cache().room_messages(1).await.unwrap().len()
        + client.cache().room_messages(2).await.unwrap().len();
    assert_eq!(delivered, 5);
}

#[tokio::test]
async fn test_refailed_entries_are_never_left_pending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    seed_unsent(&client, 4, "m1", false).await;
    seed_unsent(&client, 4, "m2", true).await;

    let report = client.retry_unsent().await;
    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 2);

    // After the pass each entry is failed again, never stuck pending
    let unsent = client.cache().unsent_messages().await.unwrap();
    assert_eq!(unsent.len(), 2);
    assert!(unsent
        .iter()
        .all(|entry| entry.status == MessageStatus::Failed));
    // The re-failure was recorded against the attempt budget
    assert!(unsent.iter().all(|entry| entry.retry_count >= 1));
}

#[tokio::test]
async fn test_exhausted_entries_are_dead_lettered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .respond_with(ConfirmEachSend::new())
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let temp_id = seed_unsent(&client, 6, "stuck", false).await;
    // Burn through the whole attempt budget
    for _ in 0..5 {
        client
            .cache()
            .mark_failed(&temp_id, "boom", "2026-03-01T09:00:01Z")
            .await
            .unwrap();
    }

    let report = client.retry_unsent().await;
    assert_eq!(report.attempted, 0);
    assert_eq!(report.dead_lettered, 1);

    // No request went out, the entry stays failed
    assert!(server.received_requests().await.unwrap().is_empty());
    let unsent = client.cache().unsent_messages().await.unwrap();
    assert_eq!(unsent[0].status, MessageStatus::Failed);
    assert_eq!(unsent[0].retry_count, 5);
}

#[tokio::test]
async fn test_backoff_defers_recent_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .respond_with(ConfirmEachSend::new())
        .mount(&server)
        .await;

    // Default policy: first retry only after the base delay
    let client = client_with_policy(&server, RetryPolicy::default()).await;
    let temp_id = seed_unsent(&client, 2, "fresh failure", false).await;
    client
        .cache()
        .mark_failed(&temp_id, "timeout", &chrono::Utc::now().to_rfc3339())
        .await
        .unwrap();

    let report = client.retry_unsent().await;
    assert_eq!(report.attempted, 0);
    assert_eq!(report.deferred, 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_pass_emits_no_signal() {
    let server = MockServer::start().await;
    let client = client_against(&server).await;
    let mut events = client.subscribe();

    let report = client.retry_unsent().await;
    assert_eq!(report, deskchat::RetryReport::default());
    assert!(drain_events(&mut events).is_empty());
}
