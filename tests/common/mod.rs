#![allow(dead_code)]

use issue_report::model::NewIssue;
use issue_report::storage::SqliteIssueStore;
use std::sync::{Arc, Once};
use std::time::Instant;
use tempfile::TempDir;
use tracing::info;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        issue_report::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl TestLogGuard {
    fn new(name: &str) -> Self {
        init_test_logging();
        info!("{name}: starting");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    TestLogGuard::new(name)
}

/// A fresh store in its own temp directory. Keep the `TempDir` alive.
pub fn test_store() -> (Arc<SqliteIssueStore>, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("db.sqlite3");
    let store = SqliteIssueStore::open(&db_path).expect("Failed to create test database");
    (Arc::new(store), dir)
}

/// A complete, valid create payload.
pub fn issue_payload(message: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "bug",
        "location": "home",
        "message": message,
        "name": "A",
        "phone": "1",
        "email": "a@b.c"
    })
}

pub fn new_issue(message: &str) -> NewIssue {
    serde_json::from_value(issue_payload(message)).expect("valid issue payload")
}
