//! End-to-end tests for the HTTP API.
//!
//! Requests run through the full router (extractors, validation, store,
//! error mapping) against a real `SQLite` file in a temp directory.

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{issue_payload, test_log, test_store};
use issue_report::IssueError;
use issue_report::model::{Issue, NewIssue};
use issue_report::server::{AppState, app_router};
use issue_report::storage::IssueStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn router_for(store: Arc<dyn IssueStore>) -> Router {
    app_router(AppState::new(store), None)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    (status, bytes.to_vec())
}

async fn post_json(app: &Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/issues/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).expect("json response"))
}

async fn get_issues(app: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri("/issues/")
        .body(Body::empty())
        .expect("request");
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).expect("json response"))
}

#[tokio::test]
async fn e2e_empty_store_lists_nothing() {
    let _log = test_log("e2e_empty_store_lists_nothing");
    let (store, _dir) = test_store();
    let app = router_for(store);

    let (status, body) = get_issues(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn e2e_create_then_list() {
    let _log = test_log("e2e_create_then_list");
    let (store, _dir) = test_store();
    let app = router_for(store);

    let (status, body) = post_json(&app, &issue_payload("broken")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Success"}));

    let (status, body) = get_issues(&app).await;
    assert_eq!(status, StatusCode::OK);
    let issues = body.as_array().expect("array");
    assert_eq!(issues.len(), 1);

    let issue = &issues[0];
    assert_eq!(issue["type"], "bug");
    assert_eq!(issue["location"], "home");
    assert_eq!(issue["message"], "broken");
    assert_eq!(issue["name"], "A");
    assert_eq!(issue["phone"], "1");
    assert_eq!(issue["email"], "a@b.c");
    let id = issue["id"].as_str().expect("id is a string");
    assert!(issue_report::util::is_valid_id_format(id));
    assert_eq!(issue.as_object().expect("object").len(), 7);
}

#[tokio::test]
async fn e2e_list_is_newest_first() {
    let _log = test_log("e2e_list_is_newest_first");
    let (store, _dir) = test_store();
    let app = router_for(store);

    for message in ["first", "second", "third"] {
        let (status, _) = post_json(&app, &issue_payload(message)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = get_issues(&app).await;
    let issues: Vec<Issue> = serde_json::from_value(body).expect("issue list");
    let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(messages, ["third", "second", "first"]);
    assert!(issues.windows(2).all(|pair| pair[0].id > pair[1].id));
}

#[tokio::test]
async fn e2e_missing_field_is_rejected() {
    let _log = test_log("e2e_missing_field_is_rejected");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let mut payload = issue_payload("broken");
    payload.as_object_mut().expect("object").remove("location");

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["errors"]["location"].is_string());
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_unknown_field_is_rejected() {
    let _log = test_log("e2e_unknown_field_is_rejected");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let mut payload = issue_payload("broken");
    payload["priority"] = json!("high");

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["priority"].is_string());
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_non_string_field_is_rejected() {
    let _log = test_log("e2e_non_string_field_is_rejected");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let mut payload = issue_payload("broken");
    payload["phone"] = json!(5_551_234);

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["phone"].is_string());
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_empty_field_is_rejected() {
    let _log = test_log("e2e_empty_field_is_rejected");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let mut payload = issue_payload("broken");
    payload["name"] = json!("");

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["name"].is_string());
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_whitespace_field_is_stored_verbatim() {
    let _log = test_log("e2e_whitespace_field_is_stored_verbatim");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let mut payload = issue_payload(" ");
    payload["phone"] = json!("  \t");

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Success"}));

    let (_, body) = get_issues(&app).await;
    assert_eq!(body[0]["message"], " ");
    assert_eq!(body[0]["phone"], "  \t");
    assert_eq!(store.count().expect("count"), 1);
}

#[tokio::test]
async fn e2e_non_object_body_is_rejected() {
    let _log = test_log("e2e_non_object_body_is_rejected");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let (status, body) = post_json(&app, &json!(["bug", "home"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_malformed_json_is_client_error() {
    let _log = test_log("e2e_malformed_json_is_client_error");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/issues/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"type\": \"bug\""))
        .expect("request");
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).expect("json response");
    assert_eq!(body["code"], "INVALID_BODY");
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_missing_content_type_is_client_error() {
    let _log = test_log("e2e_missing_content_type_is_client_error");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/issues/")
        .body(Body::from(issue_payload("broken").to_string()))
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(store.count().expect("count"), 0);
}

#[tokio::test]
async fn e2e_path_without_trailing_slash() {
    let _log = test_log("e2e_path_without_trailing_slash");
    let (store, _dir) = test_store();
    let app = router_for(store);

    let request = Request::builder()
        .method("POST")
        .uri("/issues")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(issue_payload("no slash").to_string()))
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/issues")
        .body(Body::empty())
        .expect("request");
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).expect("json response");
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn e2e_other_methods_are_not_allowed() {
    let _log = test_log("e2e_other_methods_are_not_allowed");
    let (store, _dir) = test_store();
    let app = router_for(store);

    let request = Request::builder()
        .method("DELETE")
        .uri("/issues/")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn e2e_root_redirects_to_landing_page() {
    let _log = test_log("e2e_root_redirects_to_landing_page");
    let (store, _dir) = test_store();
    let app = router_for(store);

    let request = Request::builder().uri("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("router is infallible");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/static/index.html")
    );
}

#[tokio::test]
async fn e2e_static_files_are_served() {
    let _log = test_log("e2e_static_files_are_served");
    let (store, _dir) = test_store();
    let static_dir = TempDir::new().expect("temp dir");
    std::fs::write(static_dir.path().join("index.html"), "<h1>Report an issue</h1>")
        .expect("write index");
    let app = app_router(AppState::new(store), Some(static_dir.path()));

    let request = Request::builder()
        .uri("/static/index.html")
        .body(Body::empty())
        .expect("request");
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"<h1>Report an issue</h1>");

    let request = Request::builder()
        .uri("/static/missing.html")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Store whose every operation fails the way a locked database would.
struct FailingStore;

fn locked() -> IssueError {
    IssueError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(5),
        Some("database is locked: /srv/issues/db.sqlite3".to_string()),
    ))
}

impl IssueStore for FailingStore {
    fn initialize(&self) -> issue_report::Result<()> {
        Err(locked())
    }

    fn create(&self, _issue: &NewIssue) -> issue_report::Result<String> {
        Err(locked())
    }

    fn list_all(&self) -> issue_report::Result<Vec<Issue>> {
        Err(locked())
    }
}

#[tokio::test]
async fn e2e_store_failure_is_generic_500() {
    let _log = test_log("e2e_store_failure_is_generic_500");
    let app = router_for(Arc::new(FailingStore));

    let (status, body) = post_json(&app, &issue_payload("broken")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["message"], "Internal server error");
    assert!(!body.to_string().contains("locked"));
    assert!(!body.to_string().contains("/srv/issues"));

    let (status, body) = get_issues(&app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn e2e_validation_runs_before_store() {
    let _log = test_log("e2e_validation_runs_before_store");
    let app = router_for(Arc::new(FailingStore));

    let (status, body) = post_json(&app, &json!({"type": "bug"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn e2e_unreadable_row_does_not_break_listing() {
    let _log = test_log("e2e_unreadable_row_does_not_break_listing");
    let (store, _dir) = test_store();
    let app = router_for(store.clone());

    let (status, _) = post_json(&app, &issue_payload("readable")).await;
    assert_eq!(status, StatusCode::OK);

    let conn = rusqlite::Connection::open(store.path()).expect("open db");
    conn.execute(
        "INSERT INTO issues (id, data) VALUES ('01ARZ3NDEKTSV4RRFFQ69G5FAV', ?1)",
        [r#"{"type":"bug","message":"no location","name":"A","phone":"1","email":"a@b.c"}"#],
    )
    .expect("insert legacy row");

    let (status, body) = get_issues(&app).await;
    assert_eq!(status, StatusCode::OK);
    let issues = body.as_array().expect("array");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["message"], "readable");
}

#[tokio::test]
async fn e2e_issues_survive_reopen() {
    let _log = test_log("e2e_issues_survive_reopen");
    let (store, dir) = test_store();
    let app = router_for(store.clone());
    let (status, _) = post_json(&app, &issue_payload("persisted")).await;
    assert_eq!(status, StatusCode::OK);
    drop(app);
    drop(store);

    let reopened = issue_report::storage::SqliteIssueStore::open(&dir.path().join("db.sqlite3"))
        .expect("reopen");
    let app = router_for(Arc::new(reopened));
    let (_, body) = get_issues(&app).await;
    assert_eq!(body[0]["message"], "persisted");
}
