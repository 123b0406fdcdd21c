//! Integration tests for the commentary endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Stores and notifiers are swapped for recording
//! and failing doubles to observe side effects.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use commentary_api::{
    AppState, CommentaryNotifier, CommentaryRepository, MemoryRepository, NotifyError,
    RepositoryError, build_router,
};
use commentary_types::{CommentaryEntry, MatchId, NewCommentary};
use serde_json::{Value, json};
use tower::ServiceExt;

// =========================================================================
// Test doubles
// =========================================================================

/// Store that counts calls and always fails.
#[derive(Default)]
struct FailingRepository {
    calls: AtomicUsize,
}

#[async_trait]
impl CommentaryRepository for FailingRepository {
    async fn list(
        &self,
        _match_id: MatchId,
        _limit: u32,
    ) -> Result<Vec<CommentaryEntry>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::Backend(String::from("connection refused")))
    }

    async fn insert(&self, _entry: NewCommentary) -> Result<CommentaryEntry, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::Backend(String::from("connection refused")))
    }
}

/// Wraps the memory store and counts every call that reaches it.
#[derive(Default)]
struct CountingRepository {
    inner: MemoryRepository,
    calls: AtomicUsize,
}

#[async_trait]
impl CommentaryRepository for CountingRepository {
    async fn list(
        &self,
        match_id: MatchId,
        limit: u32,
    ) -> Result<Vec<CommentaryEntry>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list(match_id, limit).await
    }

    async fn insert(&self, entry: NewCommentary) -> Result<CommentaryEntry, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(entry).await
    }
}

/// Records every notification it receives.
#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(MatchId, CommentaryEntry)>>,
}

impl CommentaryNotifier for RecordingNotifier {
    fn broadcast(&self, match_id: MatchId, entry: &CommentaryEntry) -> Result<(), NotifyError> {
        self.seen.lock().unwrap().push((match_id, entry.clone()));
        Ok(())
    }
}

/// Always fails, counting attempts.
#[derive(Default)]
struct FailingNotifier {
    calls: AtomicUsize,
}

impl CommentaryNotifier for FailingNotifier {
    fn broadcast(&self, _match_id: MatchId, _entry: &CommentaryEntry) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError(String::from("subscriber registry offline")))
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn goal_body() -> Value {
    json!({
        "minute": 10,
        "sequence": 1,
        "period": "1H",
        "eventType": "goal",
        "message": "Goal!"
    })
}

fn post(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn memory_state() -> (Arc<MemoryRepository>, Arc<AppState>) {
    let repo = Arc::new(MemoryRepository::new());
    let state = Arc::new(AppState::new(repo.clone()));
    (repo, state)
}

// =========================================================================
// Create
// =========================================================================

#[tokio::test]
async fn create_returns_201_with_server_fields() {
    let (_, state) = memory_state();

    let (status, json) = send(&state, post("/matches/42/commentary", &goal_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &json["data"];
    assert!(data["id"].is_i64());
    assert_eq!(data["matchId"], 42);
    assert_eq!(data["minute"], 10);
    assert_eq!(data["sequence"], 1);
    assert_eq!(data["period"], "1H");
    assert_eq!(data["eventType"], "goal");
    assert_eq!(data["message"], "Goal!");
    assert!(data["createdAt"].is_string());
}

#[tokio::test]
async fn create_keeps_optional_fields() {
    let (_, state) = memory_state();
    let body = json!({
        "minute": 67,
        "sequence": 2,
        "period": "2H",
        "eventType": "substitution",
        "actor": "Midfielder",
        "team": "Home",
        "message": "Fresh legs",
        "metadata": { "off": "Winger", "on": "Midfielder" },
        "tags": ["sub", "tactical"]
    });

    let (status, json) = send(&state, post("/matches/5/commentary", &body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["actor"], "Midfielder");
    assert_eq!(json["data"]["metadata"]["off"], "Winger");
    assert_eq!(json["data"]["tags"][1], "tactical");
}

#[tokio::test]
async fn create_uses_path_match_id_over_body() {
    let (repo, state) = memory_state();
    let mut body = goal_body();
    body["matchId"] = json!(999);

    let (status, json) = send(&state, post("/matches/42/commentary", &body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["matchId"], 42);
    assert!(repo.list(MatchId(999), 100).await.unwrap().is_empty());
    assert_eq!(repo.list(MatchId(42), 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_with_missing_message_is_400_and_not_persisted() {
    let (repo, state) = memory_state();
    let mut body = goal_body();
    body.as_object_mut().unwrap().remove("message");

    let (status, json) = send(&state, post("/matches/42/commentary", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid payload.");
    assert!(json["details"]["fieldErrors"]["message"].is_array());
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn create_with_malformed_json_is_400() {
    let (repo, state) = memory_state();
    let request = Request::post("/matches/42/commentary")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(&state, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid payload.");
    assert_eq!(json["details"]["formErrors"].as_array().unwrap().len(), 1);
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn create_without_json_content_type_is_400() {
    let (_, state) = memory_state();
    let request = Request::post("/matches/42/commentary")
        .body(Body::from(goal_body().to_string()))
        .unwrap();

    let (status, json) = send(&state, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid payload.");
}

#[tokio::test]
async fn create_with_invalid_match_id_never_touches_store() {
    let repo = Arc::new(CountingRepository::default());
    let state = Arc::new(AppState::new(repo.clone()));

    for path in ["/matches/abc/commentary", "/matches/0/commentary", "/matches/-1/commentary"] {
        let (status, json) = send(&state, post(path, &goal_body())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(json["error"], "Invalid path parameters.");
        assert!(json["details"]["fieldErrors"]["id"].is_array());
    }

    assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_store_failure_is_500() {
    let repo = Arc::new(FailingRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = Arc::new(AppState::new(repo.clone()).with_notifier(notifier.clone()));

    let (status, json) = send(&state, post("/matches/42/commentary", &goal_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to create commentary.");
    assert_eq!(json["details"], "connection refused");
    assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    assert!(notifier.seen.lock().unwrap().is_empty());
}

// =========================================================================
// Notifier
// =========================================================================

#[tokio::test]
async fn create_notifies_exactly_once_with_created_entry() {
    let repo = Arc::new(MemoryRepository::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = Arc::new(AppState::new(repo).with_notifier(notifier.clone()));

    let (status, json) = send(&state, post("/matches/42/commentary", &goal_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    let seen = notifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (match_id, entry) = &seen[0];
    assert_eq!(*match_id, MatchId(42));
    assert_eq!(json["data"]["id"], entry.id.into_inner());
    assert_eq!(serde_json::to_value(entry).unwrap(), json["data"]);
}

#[tokio::test]
async fn notifier_failure_does_not_change_response() {
    let repo = Arc::new(MemoryRepository::new());
    let notifier = Arc::new(FailingNotifier::default());
    let state = Arc::new(AppState::new(repo.clone()).with_notifier(notifier.clone()));

    let (status, json) = send(&state, post("/matches/42/commentary", &goal_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["message"], "Goal!");
    assert!(json.get("error").is_none());
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn create_without_notifier_still_succeeds() {
    let repo = Arc::new(MemoryRepository::new());
    let state = Arc::new(AppState::new(repo).without_notifier());
    let mut rx = state.subscribe();

    let (status, _) = send(&state, post("/matches/42/commentary", &goal_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn default_state_publishes_to_hub() {
    let (_, state) = memory_state();
    let mut rx = state.subscribe();

    let (status, json) = send(&state, post("/matches/42/commentary", &goal_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    let broadcast = rx.try_recv().unwrap();
    assert_eq!(broadcast.match_id, MatchId(42));
    assert_eq!(json["data"]["id"], broadcast.entry.id.into_inner());
}

// =========================================================================
// List
// =========================================================================

#[tokio::test]
async fn list_returns_newest_first_with_limit() {
    let (_, state) = memory_state();
    for minute in 1..=7 {
        let mut body = goal_body();
        body["minute"] = json!(minute);
        let (status, _) = send(&state, post("/matches/42/commentary", &body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, json) = send(&state, get("/matches/42/commentary?limit=5")).await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[0]["minute"], 7);
    assert_eq!(data[4]["minute"], 3);
    for pair in data.windows(2) {
        let newer = chrono::DateTime::parse_from_rfc3339(pair[0]["createdAt"].as_str().unwrap())
            .unwrap();
        let older = chrono::DateTime::parse_from_rfc3339(pair[1]["createdAt"].as_str().unwrap())
            .unwrap();
        assert!(newer >= older);
    }
}

#[tokio::test]
async fn list_defaults_and_caps_at_100() {
    let (repo, state) = memory_state();
    for minute in 0..120 {
        repo.insert(NewCommentary {
            match_id: MatchId(7),
            minute,
            sequence: 0,
            period: String::from("1H"),
            event_type: String::from("pass"),
            actor: None,
            team: None,
            message: String::from("Keeps it"),
            metadata: None,
            tags: None,
        })
        .await
        .unwrap();
    }

    let (status, json) = send(&state, get("/matches/7/commentary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 100);

    let (status, json) = send(&state, get("/matches/7/commentary?limit=500")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 100);

    let (status, json) = send(&state, get("/matches/7/commentary?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["minute"], 119);
}

#[tokio::test]
async fn list_for_match_without_entries_is_empty_200() {
    let (_, state) = memory_state();

    let (status, json) = send(&state, get("/matches/3/commentary")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn list_with_invalid_limit_is_400_without_store_access() {
    let repo = Arc::new(CountingRepository::default());
    let state = Arc::new(AppState::new(repo.clone()));

    for query in ["limit=0", "limit=-2", "limit=abc"] {
        let (status, json) = send(&state, get(&format!("/matches/42/commentary?{query}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(json["error"], "Invalid query parameters.");
        assert!(json["details"]["fieldErrors"]["limit"].is_array());
    }

    assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn list_with_invalid_match_id_is_400_without_store_access() {
    let repo = Arc::new(CountingRepository::default());
    let state = Arc::new(AppState::new(repo.clone()));

    let (status, json) = send(&state, get("/matches/nope/commentary")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid path parameters.");
    assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn list_store_failure_is_500() {
    let state = Arc::new(AppState::new(Arc::new(FailingRepository::default())));

    let (status, json) = send(&state, get("/matches/42/commentary")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch commentary.");
    assert_eq!(json["details"], "connection refused");
}

// =========================================================================
// Misc routes
// =========================================================================

#[tokio::test]
async fn health_reports_ok() {
    let (_, state) = memory_state();

    let (status, json) = send(&state, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn stream_with_invalid_match_id_is_400() {
    let (_, state) = memory_state();

    let (status, json) = send(&state, get("/matches/abc/commentary/ws")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid path parameters.");
}

#[tokio::test]
async fn stream_without_upgrade_is_rejected() {
    let (_, state) = memory_state();

    let response = build_router(state)
        .oneshot(get("/matches/42/commentary/ws"))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
